//! Fixed-width binary decoders (MTS, OASIS)

use super::{DecodeOptions, Decoded, Decoder, SkippedRecord};
use crate::core::layout::{
    mts::MTS_LAYOUT, oasis::OASIS_LAYOUT, read_layout, records, BinaryLayout, LayoutRecord,
    ScalarValue,
};
use crate::core::mapping::assign_non_empty;
use crate::core::transform::{format_unit, normalize_ndc};
use crate::domain::{Action, InputFormat, PharmaGateError, Record, Result, TableType};
use std::collections::HashSet;

type RecordMapper = fn(&LayoutRecord) -> Vec<Record>;

/// Decoder for one fixed-width layout
#[derive(Clone, Copy)]
pub struct FixedWidthDecoder {
    format: InputFormat,
    layout: &'static BinaryLayout,
    mapper: RecordMapper,
}

impl std::fmt::Debug for FixedWidthDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedWidthDecoder")
            .field("format", &self.format)
            .field("layout", &self.layout.name)
            .finish()
    }
}

impl FixedWidthDecoder {
    /// MTS decoder (2,566-byte records)
    pub fn mts() -> Self {
        Self {
            format: InputFormat::Mts,
            layout: &MTS_LAYOUT,
            mapper: map_mts,
        }
    }

    /// OASIS / psEDI decoder (2,011-byte records)
    pub fn oasis() -> Self {
        Self {
            format: InputFormat::Oasis,
            layout: &OASIS_LAYOUT,
            mapper: map_oasis,
        }
    }
}

impl Decoder for FixedWidthDecoder {
    fn format(&self) -> InputFormat {
        self.format
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let count = self
            .layout
            .record_count(raw.len())
            .ok_or(PharmaGateError::InvalidLength {
                format: self.layout.name,
                length: raw.len(),
                record_size: self.layout.record_size,
            })?;
        tracing::debug!(layout = self.layout.name, records = count, "Decoding fixed-width input");

        let mut queue = options.queue();
        let mut skipped = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (idx, chunk) in records(raw, self.layout).enumerate() {
            let decoded = read_layout(chunk, self.layout);
            let rx_number = decoded.text("rx_number");
            if rx_number.is_empty() {
                skipped.push(SkippedRecord::new(self.format, idx + 1, "empty prescription number"));
                continue;
            }
            if !seen.insert(rx_number.clone()) {
                tracing::debug!(rx_number = %rx_number, row = idx + 1, "Repeat prescription row merged");
                continue;
            }
            for record in (self.mapper)(&decoded) {
                queue.push(record);
            }
        }

        if queue.is_empty() {
            return Err(PharmaGateError::MalformedRecord(format!(
                "no {} record carried a prescription number",
                self.layout.name
            )));
        }

        Ok(Decoded {
            transactions: vec![queue],
            skipped,
        })
    }
}

fn put(record: &mut Record, source: &LayoutRecord, field: &str, target: &str) {
    assign_non_empty(record, target, &source.text(field));
}

fn dose_unit(source: &LayoutRecord, time: &str, qty: Option<&str>) -> Option<String> {
    let time = match source.get(time)? {
        ScalarValue::Time(Some(t)) => t.format("%H%M").to_string(),
        _ => return None,
    };
    let quantity = qty
        .and_then(|q| source.get(q))
        .and_then(ScalarValue::as_f64)
        .unwrap_or(1.0);
    format_unit(&time, quantity)
}

fn map_mts(src: &LayoutRecord) -> Vec<Record> {
    let mut location = Record::new(TableType::Location, Action::Add);
    put(&mut location, src, "facility_id", "RxSys_LocID");
    put(&mut location, src, "facility_name", "LocationName");
    put(&mut location, src, "facility_phone", "Phone");

    let mut prescriber = Record::new(TableType::Prescriber, Action::Add);
    put(&mut prescriber, src, "prescriber_id", "RxSys_DocID");
    put(&mut prescriber, src, "prescriber_last", "LastName");
    put(&mut prescriber, src, "prescriber_first", "FirstName");
    put(&mut prescriber, src, "prescriber_dea", "DEA_ID");

    let mut patient = Record::new(TableType::Patient, Action::Add);
    put(&mut patient, src, "patient_id", "RxSys_PatID");
    put(&mut patient, src, "patient_last", "LastName");
    put(&mut patient, src, "patient_first", "FirstName");
    put(&mut patient, src, "patient_mi", "MiddleInitial");
    put(&mut patient, src, "patient_dob", "DOB");
    put(&mut patient, src, "patient_room", "Room");
    put(&mut patient, src, "patient_gender", "Gender");
    put(&mut patient, src, "allergies", "Allergies");
    put(&mut patient, src, "facility_id", "RxSys_LocID");

    let ndc = normalize_ndc(&src.text("drug_ndc"));
    let mut drug = Record::new(TableType::Drug, Action::Add)
        .with("RxSys_DrugID", ndc.as_str())
        .with("NDCNum", ndc.as_str());
    put(&mut drug, src, "drug_name", "DrugName");
    put(&mut drug, src, "drug_strength", "Strength");
    put(&mut drug, src, "drug_unit", "Unit");
    put(&mut drug, src, "drug_form", "DoseForm");

    let mut rx = Record::new(TableType::Rx, Action::Add);
    put(&mut rx, src, "rx_number", "RxSys_RxNum");
    put(&mut rx, src, "patient_id", "RxSys_PatID");
    put(&mut rx, src, "prescriber_id", "RxSys_DocID");
    rx.set("RxSys_DrugID", ndc);
    put(&mut rx, src, "sig", "Sig");
    put(&mut rx, src, "start_date", "RxStartDate");
    put(&mut rx, src, "stop_date", "RxStopDate");
    put(&mut rx, src, "qty_dispensed", "QtyDispensed");
    put(&mut rx, src, "refills", "Refills");
    if let Some(unit) = dose_unit(src, "dose_time", Some("dose_qty")) {
        rx.set("DoseTimesQtys", unit);
    }
    put(&mut rx, src, "is_prn", "PRN");
    put(&mut rx, src, "comments", "Comments");

    vec![location, prescriber, patient, drug, rx]
}

fn map_oasis(src: &LayoutRecord) -> Vec<Record> {
    let mut store = Record::new(TableType::Store, Action::Add);
    put(&mut store, src, "store_id", "RxSys_StoreID");

    let mut location = Record::new(TableType::Location, Action::Add);
    put(&mut location, src, "facility_id", "RxSys_LocID");
    put(&mut location, src, "store_id", "RxSys_StoreID");
    put(&mut location, src, "facility_name", "LocationName");

    let mut prescriber = Record::new(TableType::Prescriber, Action::Add);
    put(&mut prescriber, src, "prescriber_id", "RxSys_DocID");
    put(&mut prescriber, src, "prescriber_last", "LastName");
    put(&mut prescriber, src, "prescriber_first", "FirstName");
    put(&mut prescriber, src, "prescriber_dea", "DEA_ID");
    put(&mut prescriber, src, "prescriber_npi", "NPI");

    let mut patient = Record::new(TableType::Patient, Action::Add);
    put(&mut patient, src, "patient_id", "RxSys_PatID");
    put(&mut patient, src, "patient_last", "LastName");
    put(&mut patient, src, "patient_first", "FirstName");
    put(&mut patient, src, "patient_dob", "DOB");
    put(&mut patient, src, "patient_address", "Address1");
    put(&mut patient, src, "patient_city", "City");
    put(&mut patient, src, "patient_state", "State");
    put(&mut patient, src, "patient_zip", "Zip");
    put(&mut patient, src, "patient_phone", "Phone1");
    put(&mut patient, src, "facility_id", "RxSys_LocID");

    let ndc = normalize_ndc(&src.text("drug_ndc"));
    let mut drug = Record::new(TableType::Drug, Action::Add)
        .with("RxSys_DrugID", ndc.as_str())
        .with("NDCNum", ndc.as_str());
    put(&mut drug, src, "drug_name", "DrugName");
    put(&mut drug, src, "drug_strength", "Strength");
    put(&mut drug, src, "drug_form", "DoseForm");

    let mut rx = Record::new(TableType::Rx, Action::Add);
    put(&mut rx, src, "rx_number", "RxSys_RxNum");
    put(&mut rx, src, "patient_id", "RxSys_PatID");
    put(&mut rx, src, "prescriber_id", "RxSys_DocID");
    rx.set("RxSys_DrugID", ndc);
    put(&mut rx, src, "sig", "Sig");
    put(&mut rx, src, "written_date", "AnchorDate");
    put(&mut rx, src, "fill_date", "RxStartDate");
    put(&mut rx, src, "qty_dispensed", "QtyDispensed");
    if let Some(unit) = dose_unit(src, "admin_time", None) {
        rx.set("DoseTimesQtys", unit);
    }
    put(&mut rx, src, "notes", "Comments");

    vec![store, location, prescriber, patient, drug, rx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::testing::encode;
    use crate::core::layout::UNKNOWN_DATE_TIME;

    fn mts_row(rx: &str, dose_time: &str) -> Vec<u8> {
        encode(
            &MTS_LAYOUT,
            &[
                ("rx_number", ScalarValue::Text(rx.into())),
                ("patient_id", ScalarValue::Text("P100".into())),
                ("patient_last", ScalarValue::Text("DOE".into())),
                ("patient_dob", ScalarValue::Text("070475".into())),
                ("facility_id", ScalarValue::Text("F1".into())),
                ("prescriber_id", ScalarValue::Text("D7".into())),
                ("drug_ndc", ScalarValue::Text("167140622".into())),
                ("drug_name", ScalarValue::Text("ZOLPIDEM".into())),
                ("qty_dispensed", ScalarValue::Int(30)),
                ("refills", ScalarValue::Int(2)),
                ("start_date", ScalarValue::Text("010520".into())),
                ("stop_date", ScalarValue::Text("XXXXXX".into())),
                ("dose_time", ScalarValue::Text(dose_time.into())),
                ("dose_qty", ScalarValue::Float(1.5)),
                ("is_prn", ScalarValue::Bool(true)),
            ],
        )
    }

    fn decode(decoder: FixedWidthDecoder, raw: &[u8]) -> Result<Decoded> {
        decoder.decode(raw, &DecodeOptions::default())
    }

    #[test]
    fn test_mts_decodes_all_sub_records() {
        let decoded = decode(FixedWidthDecoder::mts(), &mts_row("RX1", "2100")).unwrap();
        let records: Vec<_> = decoded.transactions[0].records().cloned().collect();
        let tables: Vec<_> = records.iter().map(Record::table).collect();
        assert_eq!(
            tables,
            vec![
                TableType::Location,
                TableType::Prescriber,
                TableType::Patient,
                TableType::Drug,
                TableType::Rx
            ]
        );

        let rx = &records[4];
        assert_eq!(rx.get("RxSys_RxNum"), Some("RX1"));
        assert_eq!(rx.get("RxSys_DrugID"), Some("16714062200"));
        assert_eq!(rx.get("QtyDispensed"), Some("30"));
        assert_eq!(rx.get("Refills"), Some("2"));
        assert_eq!(rx.get("RxStartDate"), Some("2020-01-05"));
        assert_eq!(rx.get("RxStopDate"), Some(UNKNOWN_DATE_TIME));
        assert_eq!(rx.get("DoseTimesQtys"), Some("210001.50"));
        assert_eq!(rx.get("PRN"), Some("1"));
        assert_eq!(records[2].get("DOB"), Some("1975-07-04"));
    }

    #[test]
    fn test_mts_dedupes_by_rx_number() {
        let mut raw = mts_row("RX1", "0800");
        raw.extend(mts_row("RX1", "2100"));
        raw.extend(mts_row("RX2", "0800"));

        let decoded = decode(FixedWidthDecoder::mts(), &raw).unwrap();
        assert_eq!(decoded.transactions.len(), 1);
        let rx: Vec<_> = decoded.transactions[0]
            .records()
            .filter(|r| r.table() == TableType::Rx)
            .collect();
        assert_eq!(rx.len(), 2);
        assert_eq!(rx[0].get("DoseTimesQtys"), Some("080001.50"));
        assert_eq!(rx[1].get("RxSys_RxNum"), Some("RX2"));
    }

    #[test]
    fn test_invalid_length_rejected() {
        let mut raw = mts_row("RX1", "0800");
        raw.push(b' ');
        let err = decode(FixedWidthDecoder::mts(), &raw).unwrap_err();
        assert!(matches!(
            err,
            PharmaGateError::InvalidLength {
                format: "MTS",
                length: 2567,
                record_size: 2566
            }
        ));

        assert!(decode(FixedWidthDecoder::oasis(), &[]).is_err());
        assert!(decode(FixedWidthDecoder::oasis(), &vec![b' '; 2010]).is_err());
    }

    #[test]
    fn test_oasis_big_endian() {
        let raw = encode(
            &OASIS_LAYOUT,
            &[
                ("store_id", ScalarValue::Text("S9".into())),
                ("rx_number", ScalarValue::Text("700001".into())),
                ("prescriber_npi", ScalarValue::Text("1234567890".into())),
                ("drug_ndc", ScalarValue::Text("00093005801".into())),
                ("qty_dispensed", ScalarValue::Float(60.0)),
                ("fill_date", ScalarValue::Text("123119".into())),
                ("admin_time", ScalarValue::Text("0900".into())),
                ("controlled", ScalarValue::Bool(false)),
            ],
        );
        let decoded = decode(FixedWidthDecoder::oasis(), &raw).unwrap();
        let records: Vec<_> = decoded.transactions[0].records().cloned().collect();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].get("RxSys_StoreID"), Some("S9"));
        assert_eq!(records[2].get("NPI"), Some("1234567890"));

        let rx = &records[5];
        assert_eq!(rx.get("RxSys_DrugID"), Some("00093005801"));
        assert_eq!(rx.get("QtyDispensed"), Some("60"));
        assert_eq!(rx.get("RxStartDate"), Some("2019-12-31"));
        assert_eq!(rx.get("DoseTimesQtys"), Some("090001.00"));
    }

    #[test]
    fn test_blank_rx_number_skipped() {
        let mut raw = mts_row("", "0800");
        raw.extend(mts_row("RX9", "0800"));
        let decoded = decode(FixedWidthDecoder::mts(), &raw).unwrap();
        assert_eq!(decoded.skipped.len(), 1);
        assert_eq!(decoded.skipped[0].position, 1);
    }
}
