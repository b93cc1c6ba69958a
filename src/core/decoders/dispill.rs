//! Dispill export decoder
//!
//! Comma-separated rows whose first character selects the shape:
//! `P` store, `F` patient, `M` medication. A medication row belongs to the
//! most recent patient row. The whole document is one transaction.

use super::drug_name::DrugName;
use super::{text, DecodeOptions, Decoded, Decoder, SkippedRecord};
use crate::core::mapping::assign_non_empty;
use crate::core::transform::{from_intake_code, normalize_date, normalize_ndc};
use crate::domain::{Action, InputFormat, PharmaGateError, Record, Result, TableType};

/// Minimum column count of an `M` row (through the NDC column)
pub const MIN_MEDICATION_COLUMNS: usize = 13;

const STORE_COLUMNS: &[&str] = &[
    "RxSys_StoreID",
    "StoreName",
    "Address1",
    "City",
    "State",
    "Zip",
    "Phone",
    "Fax",
    "DEANum",
];

const PATIENT_COLUMNS: &[&str] = &[
    "RxSys_PatID",
    "LastName",
    "FirstName",
    "DOB",
    "Gender",
    "Address1",
    "City",
    "State",
    "Zip",
    "Phone1",
    "Allergies",
    "Room",
];

mod col {
    pub const RX_NUM: usize = 0;
    pub const DRUG_NAME: usize = 1;
    pub const DOSE_FORM: usize = 2;
    pub const SIG: usize = 3;
    pub const DOC_LAST: usize = 4;
    pub const DOC_FIRST: usize = 5;
    pub const DOC_DEA: usize = 6;
    pub const START: usize = 7;
    pub const STOP: usize = 8;
    pub const QTY: usize = 9;
    pub const REFILLS: usize = 10;
    pub const INTAKE: usize = 11;
    pub const NDC: usize = 12;
    pub const PRN: usize = 13;
    pub const COMMENTS: usize = 14;
}

/// Decoder for Dispill exports
#[derive(Debug, Default, Clone, Copy)]
pub struct DispillDecoder;

impl Decoder for DispillDecoder {
    fn format(&self) -> InputFormat {
        InputFormat::Dispill
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let input = text(raw);
        let mut queue = options.queue();
        let mut skipped = Vec::new();
        let mut last_patient_id: Option<String> = None;

        for (idx, line) in input.lines().enumerate() {
            let line = line.trim();
            let Some(kind) = line.chars().next() else {
                continue;
            };
            let columns: Vec<&str> = line[kind.len_utf8()..].split(',').map(str::trim).collect();
            let row = idx + 1;

            match kind {
                'P' => queue.push(positional(TableType::Store, STORE_COLUMNS, &columns)),
                'F' => {
                    let patient = positional(TableType::Patient, PATIENT_COLUMNS, &columns);
                    last_patient_id = patient.get("RxSys_PatID").map(str::to_string);
                    queue.push(patient);
                }
                'M' => match medication(&columns, last_patient_id.as_deref()) {
                    Ok(records) => records.into_iter().for_each(|r| queue.push(r)),
                    Err(reason) => skipped.push(SkippedRecord::new(self.format(), row, reason)),
                },
                other => skipped.push(SkippedRecord::new(
                    self.format(),
                    row,
                    format!("unknown row type '{other}'"),
                )),
            }
        }

        if queue.is_empty() {
            return Err(PharmaGateError::MalformedRecord(
                "Dispill input produced no records".to_string(),
            ));
        }
        Ok(Decoded {
            transactions: vec![queue],
            skipped,
        })
    }
}

fn positional(table: TableType, names: &[&str], columns: &[&str]) -> Record {
    let mut record = Record::new(table, Action::Add);
    for (name, value) in names.iter().zip(columns) {
        assign_non_empty(&mut record, name, value);
    }
    record
}

fn medication(columns: &[&str], patient_id: Option<&str>) -> std::result::Result<Vec<Record>, String> {
    if columns.len() < MIN_MEDICATION_COLUMNS {
        return Err(format!(
            "medication row has {} columns, expected at least {MIN_MEDICATION_COLUMNS}",
            columns.len()
        ));
    }
    let patient_id = patient_id.ok_or("medication row before any patient row")?;
    let get = |i: usize| columns.get(i).copied().unwrap_or_default();

    let ndc = normalize_ndc(get(col::NDC));
    let parsed = DrugName::parse_exact(get(col::DRUG_NAME));
    let dea = get(col::DOC_DEA);

    let mut drug = Record::new(TableType::Drug, Action::Add)
        .with("RxSys_DrugID", ndc.as_str())
        .with("NDCNum", ndc.as_str());
    assign_non_empty(&mut drug, "DrugName", get(col::DRUG_NAME));
    assign_non_empty(&mut drug, "TradeName", &parsed.name);
    assign_non_empty(&mut drug, "Strength", &parsed.strength);
    assign_non_empty(&mut drug, "Unit", &parsed.unit);
    let form = if get(col::DOSE_FORM).is_empty() {
        parsed.form.as_str()
    } else {
        get(col::DOSE_FORM)
    };
    assign_non_empty(&mut drug, "DoseForm", form);

    let mut records = vec![drug];

    if !dea.is_empty() {
        let mut prescriber = Record::new(TableType::Prescriber, Action::Add)
            .with("RxSys_DocID", dea)
            .with("DEA_ID", dea);
        assign_non_empty(&mut prescriber, "LastName", get(col::DOC_LAST));
        assign_non_empty(&mut prescriber, "FirstName", get(col::DOC_FIRST));
        records.push(prescriber);
    }

    let mut rx = Record::new(TableType::Rx, Action::Add)
        .with("RxSys_RxNum", get(col::RX_NUM))
        .with("RxSys_PatID", patient_id)
        .with("RxSys_DrugID", ndc);
    assign_non_empty(&mut rx, "RxSys_DocID", dea);
    assign_non_empty(&mut rx, "Sig", get(col::SIG));
    assign_non_empty(&mut rx, "RxStartDate", &normalize_date(get(col::START)));
    assign_non_empty(&mut rx, "RxStopDate", &normalize_date(get(col::STOP)));
    assign_non_empty(&mut rx, "QtyDispensed", get(col::QTY));
    assign_non_empty(&mut rx, "Refills", get(col::REFILLS));
    assign_non_empty(&mut rx, "DoseTimesQtys", &from_intake_code(get(col::INTAKE)));
    assign_non_empty(&mut rx, "PRN", get(col::PRN));
    assign_non_empty(&mut rx, "Comments", get(col::COMMENTS));
    records.push(rx);

    Ok(records)
}
