//! MTS fixed-width layout (2,566-byte records, little-endian)

use super::{BinaryLayout, ByteOrder, LayoutField, ScalarType::*};

/// Size of one MTS record
pub const MTS_RECORD_SIZE: usize = 2566;

const FIELDS: &[LayoutField] = &[
    LayoutField::new("rx_number", 0, 10, String),
    LayoutField::new("patient_id", 10, 10, String),
    LayoutField::new("patient_last", 20, 30, String),
    LayoutField::new("patient_first", 50, 20, String),
    LayoutField::new("patient_mi", 70, 1, String),
    LayoutField::new("patient_dob", 71, 6, Date),
    LayoutField::new("patient_room", 77, 10, String),
    LayoutField::new("patient_gender", 87, 1, String),
    LayoutField::new("allergies", 88, 200, String),
    LayoutField::new("facility_id", 288, 10, String),
    LayoutField::new("facility_name", 298, 40, String),
    LayoutField::new("facility_phone", 338, 14, String),
    LayoutField::new("prescriber_id", 352, 10, String),
    LayoutField::new("prescriber_last", 362, 30, String),
    LayoutField::new("prescriber_first", 392, 20, String),
    LayoutField::new("prescriber_dea", 412, 12, String),
    LayoutField::new("drug_ndc", 424, 11, String),
    LayoutField::new("drug_name", 435, 40, String),
    LayoutField::new("drug_strength", 475, 10, String),
    LayoutField::new("drug_unit", 485, 10, String),
    LayoutField::new("drug_form", 495, 20, String),
    LayoutField::new("sig", 515, 1024, String),
    LayoutField::new("qty_dispensed", 1539, 4, Int32),
    LayoutField::new("refills", 1543, 2, Int16),
    LayoutField::new("start_date", 1545, 6, Date),
    LayoutField::new("stop_date", 1551, 6, Date),
    LayoutField::new("dose_time", 1557, 4, Time),
    LayoutField::new("dose_qty", 1561, 4, Float32),
    LayoutField::new("is_prn", 1565, 1, Bool),
    LayoutField::new("comments", 1566, 1000, String),
];

/// MTS layout
pub const MTS_LAYOUT: BinaryLayout = BinaryLayout {
    name: "MTS",
    record_size: MTS_RECORD_SIZE,
    byte_order: ByteOrder::Little,
    fields: FIELDS,
};
