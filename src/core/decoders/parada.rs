//! Parada vendor-row decoder
//!
//! Parada sends one `~`-separated row per administration, so a prescription
//! taken three times a day arrives as three rows sharing an Rx number. The
//! decoder folds consecutive rows with the same Rx number into one
//! [`VendorRowGroup`] and flushes each group as its own transaction.
//!
//! When a group saw more than one distinct dose time, the schedule is
//! lifted out of the Rx into a synthesized `TimesQtys` record and the Rx
//! refers to it by name instead.

use super::drug_name::DrugName;
use super::{text, DecodeOptions, Decoded, Decoder, SkippedRecord};
use crate::core::commit::WriteQueue;
use crate::core::mapping::assign_non_empty;
use crate::core::transform::{format_unit, normalize_date, normalize_ndc};
use crate::domain::{Action, InputFormat, PharmaGateError, Record, Result, TableType};

/// Columns per row
pub const COLUMNS: usize = 26;

/// Column separator
pub const SEPARATOR: char = '~';

/// NDC value Parada uses for compounded drugs
const COMPOUND_NDC: &str = "0";

mod col {
    pub const FACILITY_ID: usize = 0;
    pub const FACILITY_NAME: usize = 1;
    pub const PAT_ID: usize = 2;
    pub const PAT_LAST: usize = 3;
    pub const PAT_FIRST: usize = 4;
    pub const DOB: usize = 5;
    pub const ROOM: usize = 6;
    pub const DOC_ID: usize = 7;
    pub const DOC_LAST: usize = 8;
    pub const DOC_FIRST: usize = 9;
    pub const DEA: usize = 10;
    pub const DRUG_NAME: usize = 11;
    pub const NDC: usize = 12;
    pub const SIG: usize = 13;
    pub const QTY_DISPENSED: usize = 14;
    pub const RX_NUM: usize = 15;
    pub const START: usize = 16;
    pub const STOP: usize = 17;
    pub const DOSE_TIME: usize = 18;
    pub const DOSE_QTY: usize = 19;
    pub const REFILLS: usize = 20;
    pub const GENDER: usize = 21;
    pub const ALLERGIES: usize = 22;
    pub const FACILITY_PHONE: usize = 23;
    pub const COMMENTS: usize = 24;
    pub const STATUS: usize = 25;
}

/// Decoder for Parada vendor rows
#[derive(Debug, Default, Clone, Copy)]
pub struct ParadaDecoder;

impl Decoder for ParadaDecoder {
    fn format(&self) -> InputFormat {
        InputFormat::Parada
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let input = text(raw);
        let mut state = DocumentState::new(*options);
        let mut skipped = Vec::new();

        for (idx, line) in rows(&input).enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match split_row(line) {
                Ok(row) if row[col::NDC].trim() == COMPOUND_NDC => {
                    skipped.push(SkippedRecord::new(
                        self.format(),
                        idx + 1,
                        format!("compound drug on Rx {} cannot be mapped", row[col::RX_NUM].trim()),
                    ));
                }
                Ok(row) => state.accept(&row),
                Err(reason) => skipped.push(SkippedRecord::new(self.format(), idx + 1, reason)),
            }
        }

        let transactions = state.finish();
        if transactions.is_empty() {
            return Err(PharmaGateError::MalformedRecord(
                "Parada input produced no prescriptions".to_string(),
            ));
        }
        tracing::debug!(groups = transactions.len(), "Parada rows grouped");
        Ok(Decoded {
            transactions,
            skipped,
        })
    }
}

/// Rows ended by `\r\n`, a bare `\r` or a bare `\n`
fn rows(input: &str) -> impl Iterator<Item = &str> {
    input.split('\n').flat_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.split('\r')
    })
}

/// Splits a row, tolerating the empty column left by the trailing `~`
fn split_row(line: &str) -> std::result::Result<Vec<&str>, String> {
    let mut columns: Vec<&str> = line.split(SEPARATOR).collect();
    if columns.len() == COLUMNS + 1 && columns[COLUMNS].trim().is_empty() {
        columns.pop();
    }
    if columns.len() != COLUMNS {
        return Err(format!(
            "row has {} columns, expected {COLUMNS}",
            columns.len()
        ));
    }
    Ok(columns)
}

/// Rows of one prescription being folded together
#[derive(Debug)]
pub struct VendorRowGroup {
    key: String,
    facility_name: String,
    location: Record,
    prescriber: Record,
    patient: Record,
    drug: Record,
    rx: Record,
    doses: Vec<(String, String)>,
}

impl VendorRowGroup {
    fn start(row: &[&str]) -> Self {
        let get = |i: usize| row[i].trim();
        let ndc = normalize_ndc(get(col::NDC));

        let mut location =
            Record::new(TableType::Location, Action::Add).with("RxSys_LocID", get(col::FACILITY_ID));
        assign_non_empty(&mut location, "LocationName", get(col::FACILITY_NAME));
        assign_non_empty(&mut location, "Phone", get(col::FACILITY_PHONE));

        let mut prescriber =
            Record::new(TableType::Prescriber, Action::Add).with("RxSys_DocID", get(col::DOC_ID));
        assign_non_empty(&mut prescriber, "LastName", get(col::DOC_LAST));
        assign_non_empty(&mut prescriber, "FirstName", get(col::DOC_FIRST));
        assign_non_empty(&mut prescriber, "DEA_ID", get(col::DEA));

        let mut patient =
            Record::new(TableType::Patient, Action::Add).with("RxSys_PatID", get(col::PAT_ID));
        assign_non_empty(&mut patient, "LastName", get(col::PAT_LAST));
        assign_non_empty(&mut patient, "FirstName", get(col::PAT_FIRST));
        assign_non_empty(&mut patient, "DOB", get(col::DOB));
        assign_non_empty(&mut patient, "Room", get(col::ROOM));
        assign_non_empty(&mut patient, "RxSys_LocID", get(col::FACILITY_ID));
        assign_non_empty(&mut patient, "RxSys_PrimaryDoc", get(col::DOC_ID));
        assign_non_empty(&mut patient, "Gender", get(col::GENDER));
        assign_non_empty(&mut patient, "Allergies", get(col::ALLERGIES));

        let parsed = DrugName::parse_exact(get(col::DRUG_NAME));
        let mut drug = Record::new(TableType::Drug, Action::Add)
            .with("RxSys_DrugID", ndc.as_str())
            .with("NDCNum", ndc.as_str());
        assign_non_empty(&mut drug, "DrugName", get(col::DRUG_NAME));
        assign_non_empty(&mut drug, "TradeName", &parsed.name);
        assign_non_empty(&mut drug, "Strength", &parsed.strength);
        assign_non_empty(&mut drug, "Unit", &parsed.unit);
        assign_non_empty(&mut drug, "DoseForm", &parsed.form);

        let mut rx = Record::new(TableType::Rx, Action::Add)
            .with("RxSys_RxNum", get(col::RX_NUM))
            .with("RxSys_PatID", get(col::PAT_ID))
            .with("RxSys_DocID", get(col::DOC_ID))
            .with("RxSys_DrugID", ndc);
        assign_non_empty(&mut rx, "Sig", get(col::SIG));
        assign_non_empty(&mut rx, "RxStartDate", &normalize_date(get(col::START)));
        assign_non_empty(&mut rx, "RxStopDate", &normalize_date(get(col::STOP)));
        assign_non_empty(&mut rx, "QtyDispensed", get(col::QTY_DISPENSED));
        assign_non_empty(&mut rx, "Refills", get(col::REFILLS));
        assign_non_empty(&mut rx, "Comments", get(col::COMMENTS));
        let status = get(col::STATUS);
        rx.set("Status", if status.is_empty() { "1" } else { status });

        let mut group = Self {
            key: get(col::RX_NUM).to_string(),
            facility_name: get(col::FACILITY_NAME).to_string(),
            location,
            prescriber,
            patient,
            drug,
            rx,
            doses: Vec::new(),
        };
        group.add_dose(row);
        group
    }

    /// Prescription key (Rx number) of this group
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Records a dose time/quantity pair unless it was already seen
    fn add_dose(&mut self, row: &[&str]) {
        let time: String = row[col::DOSE_TIME]
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if time.is_empty() {
            return;
        }
        let quantity = row[col::DOSE_QTY].trim();
        let quantity = if quantity.is_empty() { "1" } else { quantity };

        if self.doses.iter().any(|(t, q)| *t == time && q == quantity) {
            return;
        }
        self.doses.push((time, quantity.to_string()));

        let schedule: String = self
            .doses
            .iter()
            .filter_map(|(t, q)| format_unit(&format!("{t:0>4}"), q.parse().unwrap_or(1.0)))
            .collect();
        if schedule.is_empty() {
            self.rx.remove("DoseTimesQtys");
        } else {
            self.rx.set("DoseTimesQtys", schedule);
        }
    }

    fn distinct_times(&self) -> usize {
        let mut times: Vec<&str> = self.doses.iter().map(|(t, _)| t.as_str()).collect();
        times.sort_unstable();
        times.dedup();
        times.len()
    }

    /// Builds the group's transaction
    ///
    /// `schedule_version` is advanced when a `TimesQtys` record is emitted.
    fn flush(self, options: &DecodeOptions, schedule_version: &mut u32) -> WriteQueue {
        let distinct_times = self.distinct_times();
        let Self {
            key,
            facility_name,
            location,
            prescriber,
            patient,
            drug,
            mut rx,
            ..
        } = self;

        let mut queue = options.queue();
        let location_id = location.get("RxSys_LocID").map(str::to_string);
        queue.push(location);
        queue.push(prescriber);
        queue.push(patient);
        queue.push(drug);

        if distinct_times > 1 {
            let name = schedule_name(&facility_name, *schedule_version);
            *schedule_version += 1;
            let schedule = rx.remove("DoseTimesQtys").unwrap_or_default();
            tracing::debug!(rx = %key, schedule = %name, "Synthesized dose schedule");

            let mut times_qtys = Record::new(TableType::TimesQtys, Action::Add);
            if let Some(loc) = location_id {
                times_qtys.set("RxSys_LocID", loc);
            }
            times_qtys.set("DoseScheduleName", name.as_str());
            times_qtys.set("DoseTimesQtys", schedule);
            queue.push(times_qtys);
            rx.set("DoseScheduleName", name);
        }

        queue.push(rx);
        queue
    }
}

/// Schedule name: first three non-blank facility characters, upper-cased,
/// followed by the version
fn schedule_name(facility_name: &str, version: u32) -> String {
    let prefix: String = facility_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!("{prefix}{version}")
}

struct DocumentState {
    options: DecodeOptions,
    current: Option<VendorRowGroup>,
    transactions: Vec<WriteQueue>,
    schedule_version: u32,
}

impl DocumentState {
    fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            current: None,
            transactions: Vec::new(),
            schedule_version: 1,
        }
    }

    fn accept(&mut self, row: &[&str]) {
        match self.current.as_mut() {
            Some(group) if group.key() == row[col::RX_NUM].trim() => group.add_dose(row),
            _ => {
                self.flush();
                self.current = Some(VendorRowGroup::start(row));
            }
        }
    }

    fn flush(&mut self) {
        if let Some(group) = self.current.take() {
            let queue = group.flush(&self.options, &mut self.schedule_version);
            self.transactions.push(queue);
        }
    }

    fn finish(mut self) -> Vec<WriteQueue> {
        self.flush();
        self.transactions
    }
}
