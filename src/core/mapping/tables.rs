//! Positional field tables per gateway table
//!
//! Each entry is `(canonical field name, present in V1)`. Positions are the
//! 1-based index of the entry. V2 is a superset of V1; V2-only slots are
//! skipped when walking a V1 record.

pub(crate) const STORE: &[(&str, bool)] = &[
    ("RxSys_StoreID", true),
    ("StoreName", true),
    ("Address1", true),
    ("Address2", true),
    ("City", true),
    ("State", true),
    ("Zip", true),
    ("Phone", true),
    ("Fax", true),
    ("DEANum", true),
    ("NPI", false),
];

pub(crate) const LOCATION: &[(&str, bool)] = &[
    ("RxSys_LocID", true),
    ("RxSys_StoreID", true),
    ("LocationName", true),
    ("Address1", true),
    ("Address2", true),
    ("City", true),
    ("State", true),
    ("Zip", true),
    ("Phone", true),
    ("Comments", true),
    ("CycleDays", true),
    ("CycleType", true),
    ("Fax", true),
    ("ContactName", true),
    ("Status", true),
    ("Email", true),
    ("LocationType", false),
];

pub(crate) const PRESCRIBER: &[(&str, bool)] = &[
    ("RxSys_DocID", true),
    ("LastName", true),
    ("FirstName", true),
    ("MiddleInitial", true),
    ("Address1", true),
    ("Address2", true),
    ("City", true),
    ("State", true),
    ("Zip", true),
    ("Phone1", true),
    ("Phone2", true),
    ("Comments", true),
    ("DEA_ID", true),
    ("TPID", true),
    ("Specialty", true),
    ("Fax", true),
    ("PagerInfo", true),
    ("Email", false),
];

pub(crate) const NO_EXTRA: &[&str] = &[];

/// Prescriber fields that are not positional (produced by the `DEA|NPI` split)
pub(crate) const PRESCRIBER_EXTRA: &[&str] = &["NPI"];

pub(crate) const DRUG: &[(&str, bool)] = &[
    ("RxSys_DrugID", true),
    ("LblCode", true),
    ("ProdCode", true),
    ("TradeName", true),
    ("Strength", true),
    ("Unit", true),
    ("RxOTC", true),
    ("DoseForm", true),
    ("Route", true),
    ("DrugSchedule", true),
    ("VisualDescription", true),
    ("DrugName", true),
    ("ShortName", true),
    ("NDCNum", true),
    ("Barcode", true),
    ("SizeFactor", true),
    ("Template", true),
    ("DefaultIsolate", true),
    ("ConsultMsg", true),
    ("GenericFor", true),
    ("Manufacturer", false),
    ("Comments", true),
    ("ImagePath", false),
];

pub(crate) const PATIENT: &[(&str, bool)] = &[
    ("RxSys_PatID", true),
    ("LastName", true),
    ("FirstName", true),
    ("MiddleInitial", true),
    ("Suffix", false),
    ("Address1", true),
    ("Address2", true),
    ("City", true),
    ("State", true),
    ("Zip", true),
    ("Phone1", true),
    ("Phone2", true),
    ("WorkPhone", true),
    ("MobilePhone", false),
    ("RxSys_LocID", true),
    ("Room", true),
    ("Comments", true),
    ("CycleDate", true),
    ("CycleDays", true),
    ("CycleType", true),
    ("Status", true),
    ("RxSys_LastDoc", true),
    ("RxSys_PrimaryDoc", true),
    ("RxSys_AltDoc", true),
    ("SSN", true),
    ("Allergies", true),
    ("Diet", true),
    ("DxNotes", true),
    ("TreatmentNotes", true),
    ("DOB", true),
    ("Height", true),
    ("Weight", true),
    ("ResponsibleName", true),
    ("InsName", true),
    ("InsPNo", true),
    ("AltInsName", true),
    ("AltInsPNo", true),
    ("MCareNum", true),
    ("MCaidNum", true),
    ("AdmitDate", true),
    ("ChartOnly", true),
    ("Gender", true),
    ("Email", true),
    ("Language", true),
    ("CodeStatus", true),
    ("MedicalRecordNum", true),
    ("DischargeDate", true),
];

pub(crate) const RX: &[(&str, bool)] = &[
    ("RxSys_RxNum", true),
    ("RxSys_PatID", true),
    ("RxSys_DocID", true),
    ("RxSys_DrugID", true),
    ("Sig", true),
    ("RxStartDate", true),
    ("RxStopDate", true),
    ("DiscontinueDate", true),
    ("DoseScheduleName", true),
    ("Comments", true),
    ("Refills", true),
    ("RxSys_NewRxNum", true),
    ("Isolate", true),
    ("RxType", true),
    ("MDOMStart", true),
    ("MDOMEnd", true),
    ("QtyPerDose", true),
    ("QtyDispensed", true),
    ("Status", true),
    ("DoW", true),
    ("SpecialDoses", true),
    ("DoseTimesQtys", true),
    ("ChartOnly", true),
    ("AnchorDate", true),
    ("PRN", false),
];

pub(crate) const TIMES_QTYS: &[(&str, bool)] = &[
    ("RxSys_LocID", true),
    ("DoseScheduleName", true),
    ("DoseTimesQtys", true),
];
