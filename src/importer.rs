use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{date_to_utc, ImportError, ImportResult, ImportedEntry, VisitInput};
use crate::store::VisitStore;

const EMPTY_FILE: &str = "File is empty or has no data rows";
const READ_FAILED: &str = "Failed to read file";
const PARSE_FAILED: &str = "Failed to parse CSV file. Please ensure it is a valid CSV file.";

// Tried in order; the first one that yields a real calendar date wins.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%-m/%-d/%Y",
    "%-d/%-m/%Y",
];

// ---------------------------------------------------------------------------
// Fields and header aliases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    VisitDate,
    HospitalName,
    DoctorName,
    PatientName,
    HospitalCharges,
    MedicineCharges,
    MedicineName,
    Address,
}

impl Field {
    /// Display name, used as `ImportError::field`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VisitDate => "Visit Date",
            Self::HospitalName => "Hospital Name",
            Self::DoctorName => "Doctor Name",
            Self::PatientName => "Patient Name",
            Self::HospitalCharges => "Hospital Charges",
            Self::MedicineCharges => "Medicine Charges",
            Self::MedicineName => "Medicine Name",
            Self::Address => "Address",
        }
    }

    /// Header names accepted for this field, highest priority first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::VisitDate => &["Visit Date", "Date", "visitDate"],
            Self::HospitalName => &["Hospital Name", "Hospital", "hospitalName"],
            Self::DoctorName => &["Doctor Name", "Doctor", "doctorName"],
            Self::PatientName => &["Patient Name", "Patient", "patientName"],
            Self::HospitalCharges => &["Hospital Charges", "hospitalRs", "Hospital Rs"],
            Self::MedicineCharges => &["Medicine Charges", "medicineRs", "Medicine Rs"],
            Self::MedicineName => &["Medicine Name", "Medicine", "medicineName"],
            Self::Address => &["Address", "address"],
        }
    }

    pub fn invalid_message(&self) -> &'static str {
        match self {
            Self::VisitDate => "Invalid or missing date",
            Self::HospitalName => "Hospital name is required",
            Self::DoctorName => "Doctor name is required",
            Self::PatientName => "Patient name is required",
            Self::HospitalCharges => "Invalid or missing hospital charges",
            Self::MedicineCharges => "Invalid or missing medicine charges",
            Self::MedicineName => "Medicine name is required",
            Self::Address => "Address is required",
        }
    }
}

struct Header {
    lowered: Vec<String>,
}

impl Header {
    fn parse(line: &str) -> Self {
        let lowered = split_csv_line(line)
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        Self { lowered }
    }

    /// Trimmed cell for `field`, or "" when no alias resolves to a non-empty cell.
    fn value<'a>(&self, field: Field, cells: &'a [String]) -> &'a str {
        for alias in field.aliases() {
            let alias = alias.to_lowercase();
            let Some(idx) = self.lowered.iter().position(|h| h.contains(&alias)) else {
                continue;
            };
            if let Some(cell) = cells.get(idx).filter(|c| !c.is_empty()) {
                return cell.trim();
            }
        }
        ""
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split one CSV line into fields. `""` inside quotes is a literal quote.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

pub fn parse_visit_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Parse a non-negative charge and floor it to whole rupees.
/// Values the store cannot hold (above `i64::MAX`) are rejected.
pub fn parse_charge(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let n: f64 = s.parse().ok()?;
    if !n.is_finite() || n < 0.0 {
        return None;
    }
    let floored = n.floor();
    if floored >= i64::MAX as f64 {
        return None;
    }
    Some(floored as u64)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

fn validate_row(
    row: usize,
    header: &Header,
    cells: &[String],
) -> std::result::Result<ImportedEntry, Vec<ImportError>> {
    let visit_date: Option<DateTime<Utc>> =
        parse_visit_date(header.value(Field::VisitDate, cells)).map(date_to_utc);
    let hospital_name = non_empty(header.value(Field::HospitalName, cells));
    let doctor_name = non_empty(header.value(Field::DoctorName, cells));
    let patient_name = non_empty(header.value(Field::PatientName, cells));
    let hospital_rs = parse_charge(header.value(Field::HospitalCharges, cells));
    let medicine_rs = parse_charge(header.value(Field::MedicineCharges, cells));
    let medicine_name = non_empty(header.value(Field::MedicineName, cells));
    let address = non_empty(header.value(Field::Address, cells));

    let checks = [
        (Field::VisitDate, visit_date.is_some()),
        (Field::HospitalName, hospital_name.is_some()),
        (Field::DoctorName, doctor_name.is_some()),
        (Field::PatientName, patient_name.is_some()),
        (Field::HospitalCharges, hospital_rs.is_some()),
        (Field::MedicineCharges, medicine_rs.is_some()),
        (Field::MedicineName, medicine_name.is_some()),
        (Field::Address, address.is_some()),
    ];
    let errors: Vec<ImportError> = checks
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(field, _)| ImportError {
            row,
            field: field.label().to_string(),
            message: field.invalid_message().to_string(),
        })
        .collect();

    match (
        visit_date,
        hospital_name,
        doctor_name,
        patient_name,
        hospital_rs,
        medicine_rs,
        medicine_name,
        address,
    ) {
        (
            Some(visit_date),
            Some(hospital_name),
            Some(doctor_name),
            Some(patient_name),
            Some(hospital_rs),
            Some(medicine_rs),
            Some(medicine_name),
            Some(address),
        ) => Ok(ImportedEntry {
            visit_date,
            hospital_name,
            doctor_name,
            patient_name,
            hospital_rs,
            medicine_rs,
            medicine_name,
            address,
        }),
        _ => Err(errors),
    }
}

/// Parse CSV text into validated entries and per-row errors.
pub fn parse_import_text(text: &str) -> ImportResult {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return ImportResult::file_error(EMPTY_FILE);
    }

    let header = Header::parse(lines[0]);
    let mut result = ImportResult::default();

    for (i, line) in lines.iter().enumerate().skip(1) {
        let row = i + 1;
        let cells = split_csv_line(line);
        match validate_row(row, &header, &cells) {
            Ok(entry) => result.entries.push(entry),
            Err(errors) => {
                debug!(row, count = errors.len(), "row rejected");
                result.errors.extend(errors);
            }
        }
    }

    info!(
        entries = result.entries.len(),
        errors = result.errors.len(),
        "parsed import file"
    );
    result
}

/// Read and parse a CSV file. Never fails: read and decode problems come
/// back as a single file-level error.
pub fn read_import_file(path: &Path) -> ImportResult {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read import file");
            return ImportResult::file_error(READ_FAILED);
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => parse_import_text(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "import file is not UTF-8");
            ImportResult::file_error(PARSE_FAILED)
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SubmitSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// `"<hospital>: <reason>"` per failed entry, in submission order.
    pub failures: Vec<String>,
}

/// Create each entry individually. Failures are counted, not rolled back.
pub fn submit_entries<S: VisitStore + ?Sized>(store: &S, entries: &[ImportedEntry]) -> SubmitSummary {
    let mut summary = SubmitSummary::default();
    for entry in entries {
        match store.create_entry(&VisitInput::from(entry)) {
            Ok(id) => {
                debug!(id, hospital = %entry.hospital_name, "entry created");
                summary.succeeded += 1;
            }
            Err(e) => {
                warn!(hospital = %entry.hospital_name, error = %e, "failed to import entry");
                summary.failed += 1;
                summary
                    .failures
                    .push(format!("{}: {}", entry.hospital_name, e.user_message()));
            }
        }
    }
    info!(succeeded = summary.succeeded, failed = summary.failed, "submission finished");
    summary
}

// ---------------------------------------------------------------------------
// Import ledger
// ---------------------------------------------------------------------------

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

pub fn is_duplicate_file(conn: &Connection, owner: &str, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND owner = ?2")?;
    Ok(stmt.exists(rusqlite::params![checksum, owner])?)
}

pub fn record_import(
    conn: &Connection,
    owner: &str,
    file_path: &Path,
    entries: &[ImportedEntry],
    imported: usize,
    checksum: &str,
) -> Result<()> {
    let dates: Vec<String> = entries
        .iter()
        .map(|e| e.visit_date.format("%Y-%m-%d").to_string())
        .collect();
    let min_date = dates.iter().min();
    let max_date = dates.iter().max();
    conn.execute(
        "INSERT INTO imports (filename, owner, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            owner,
            imported as i64,
            min_date,
            max_date,
            checksum,
        ],
    )?;
    Ok(())
}
