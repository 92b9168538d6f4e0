use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

/// A stored visit record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitEntry {
    pub id: i64,
    pub owner: String,
    pub created_at: i64,
    pub visit_date: i64,
    pub hospital_name: String,
    pub doctor_name: String,
    pub patient_name: String,
    pub hospital_rs: u64,
    pub medicine_rs: u64,
    pub medicine_name: String,
    pub address: String,
}

impl VisitEntry {
    pub fn total_rs(&self) -> u64 {
        self.hospital_rs.saturating_add(self.medicine_rs)
    }

    pub fn visit_day(&self) -> NaiveDate {
        millis_to_date(self.visit_date)
    }
}

/// Payload accepted by the store for create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitInput {
    pub hospital_name: String,
    /// Epoch milliseconds, UTC midnight of the visit day.
    pub visit_date: i64,
    pub doctor_name: String,
    pub patient_name: String,
    pub hospital_rs: u64,
    pub medicine_rs: u64,
    pub medicine_name: String,
    pub address: String,
}

/// A fully validated CSV row, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedEntry {
    pub visit_date: DateTime<Utc>,
    pub hospital_name: String,
    pub doctor_name: String,
    pub patient_name: String,
    pub hospital_rs: u64,
    pub medicine_rs: u64,
    pub medicine_name: String,
    pub address: String,
}

impl From<&ImportedEntry> for VisitInput {
    fn from(e: &ImportedEntry) -> Self {
        Self {
            hospital_name: e.hospital_name.clone(),
            visit_date: e.visit_date.timestamp_millis(),
            doctor_name: e.doctor_name.clone(),
            patient_name: e.patient_name.clone(),
            hospital_rs: e.hospital_rs,
            medicine_rs: e.medicine_rs,
            medicine_name: e.medicine_name.clone(),
            address: e.address.clone(),
        }
    }
}

/// One failed check. `row` is 0 for file-level problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl ImportError {
    pub fn file(message: &str) -> Self {
        Self {
            row: 0,
            field: "File".to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub entries: Vec<ImportedEntry>,
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    pub fn file_error(message: &str) -> Self {
        Self {
            entries: Vec::new(),
            errors: vec![ImportError::file(message)],
        }
    }
}

pub fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

pub fn millis_to_date(millis: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .unwrap_or_default()
}
