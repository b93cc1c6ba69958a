//! OASIS / psEDI fixed-width layout (2,011-byte records, big-endian)

use super::{BinaryLayout, ByteOrder, LayoutField, ScalarType::*};

/// Size of one OASIS record
pub const OASIS_RECORD_SIZE: usize = 2011;

const FIELDS: &[LayoutField] = &[
    LayoutField::new("store_id", 0, 10, String),
    LayoutField::new("rx_number", 10, 12, String),
    LayoutField::new("fill_number", 22, 2, Int16),
    LayoutField::new("patient_id", 24, 12, String),
    LayoutField::new("patient_last", 36, 35, String),
    LayoutField::new("patient_first", 71, 25, String),
    LayoutField::new("patient_dob", 96, 6, Date),
    LayoutField::new("patient_address", 102, 40, String),
    LayoutField::new("patient_city", 142, 25, String),
    LayoutField::new("patient_state", 167, 2, String),
    LayoutField::new("patient_zip", 169, 10, String),
    LayoutField::new("patient_phone", 179, 14, String),
    LayoutField::new("facility_id", 193, 10, String),
    LayoutField::new("facility_name", 203, 40, String),
    LayoutField::new("prescriber_id", 243, 12, String),
    LayoutField::new("prescriber_last", 255, 35, String),
    LayoutField::new("prescriber_first", 290, 25, String),
    LayoutField::new("prescriber_dea", 315, 12, String),
    LayoutField::new("prescriber_npi", 327, 10, String),
    LayoutField::new("drug_ndc", 337, 11, String),
    LayoutField::new("drug_name", 348, 60, String),
    LayoutField::new("drug_strength", 408, 15, String),
    LayoutField::new("drug_form", 423, 20, String),
    LayoutField::new("sig", 443, 1000, String),
    LayoutField::new("qty_dispensed", 1443, 8, Float64),
    LayoutField::new("days_supply", 1451, 4, Int32),
    LayoutField::new("written_date", 1455, 6, Date),
    LayoutField::new("fill_date", 1461, 6, Date),
    LayoutField::new("admin_time", 1467, 4, Time),
    LayoutField::new("rx_serial", 1471, 8, Int64),
    LayoutField::new("controlled", 1479, 1, Bool),
    LayoutField::new("notes", 1480, 531, String),
];

/// OASIS layout
pub const OASIS_LAYOUT: BinaryLayout = BinaryLayout {
    name: "OASIS",
    record_size: OASIS_RECORD_SIZE,
    byte_order: ByteOrder::Big,
    fields: FIELDS,
};
