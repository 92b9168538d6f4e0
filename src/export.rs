use std::io::Write;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{MedlogError, Result};
use crate::models::VisitEntry;

pub const EXPORT_HEADERS: [&str; 9] = [
    "Visit Date",
    "Hospital Name",
    "Doctor Name",
    "Patient Name",
    "Hospital Charges (Rs)",
    "Medicine Charges (Rs)",
    "Total Charges (Rs)",
    "Medicine Name",
    "Address",
];

pub fn default_file_name(today: NaiveDate) -> String {
    format!("hospital-visits-{}.csv", today.format("%Y-%m-%d"))
}

fn flatten(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

/// Write entries as CSV, quoting only fields that need it.
pub fn write_csv<W: Write>(entries: &[VisitEntry], out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    wtr.write_record(EXPORT_HEADERS)?;
    for e in entries {
        wtr.write_record([
            e.visit_day().format("%Y-%m-%d").to_string(),
            e.hospital_name.clone(),
            e.doctor_name.clone(),
            e.patient_name.clone(),
            e.hospital_rs.to_string(),
            e.medicine_rs.to_string(),
            e.total_rs().to_string(),
            flatten(&e.medicine_name),
            flatten(&e.address),
        ])?;
    }
    wtr.flush()?;
    debug!(rows = entries.len(), "wrote csv export");
    Ok(())
}

pub fn to_csv_string(entries: &[VisitEntry]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(entries, &mut buf)?;
    String::from_utf8(buf).map_err(|e| MedlogError::Other(e.to_string()))
}
