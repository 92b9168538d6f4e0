use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::Table;
use tracing::{info, warn};

use crate::cli::open_store;
use crate::error::{MedlogError, Result};
use crate::fmt::rupees;
use crate::importer::{
    compute_checksum, is_duplicate_file, read_import_file, record_import, submit_entries,
    SubmitSummary,
};
use crate::models::{ImportResult, ImportedEntry};
use crate::store::SqliteStore;

const FAILURES_SHOWN: usize = 3;

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn print_preview(result: &ImportResult) {
    let valid = result.entries.len();
    println!(
        "{}",
        format!("{valid} valid {} ready to import", if valid == 1 { "entry" } else { "entries" })
            .green()
    );

    if !result.errors.is_empty() {
        println!("{}", format!("{} errors found", result.errors.len()).red());
        let mut table = Table::new();
        table.set_header(vec!["Row", "Field", "Message"]);
        for e in &result.errors {
            table.add_row(vec![e.row.to_string(), e.field.clone(), e.message.clone()]);
        }
        println!("{table}");
    }

    if valid > 0 {
        let mut table = Table::new();
        table.set_header(vec!["Date", "Hospital", "Doctor", "Patient", "Total Rs"]);
        for e in &result.entries {
            table.add_row(vec![
                e.visit_date.format("%Y-%m-%d").to_string(),
                e.hospital_name.clone(),
                e.doctor_name.clone(),
                e.patient_name.clone(),
                rupees(e.hospital_rs.saturating_add(e.medicine_rs)),
            ]);
        }
        println!("{table}");
    }
}

/// Submit entries, then note the file in the ledger if anything was saved.
/// A ledger failure is logged; the entries already saved stay saved.
fn submit_and_record(
    store: &SqliteStore,
    file_path: &Path,
    entries: &[ImportedEntry],
    checksum: &str,
) -> SubmitSummary {
    let summary = submit_entries(store, entries);
    if summary.succeeded == 0 {
        return summary;
    }
    if let Err(e) = record_import(
        store.conn(),
        store.owner(),
        file_path,
        entries,
        summary.succeeded,
        checksum,
    ) {
        warn!(file = %file_path.display(), error = %e, "could not record import in ledger");
    }
    summary
}

pub fn run(file: &str, dry_run: bool, json: bool, force: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    if !has_csv_extension(&file_path) {
        return Err(MedlogError::NotCsv(file.to_string()));
    }

    let result = read_import_file(&file_path);
    info!(
        file = %file_path.display(),
        entries = result.entries.len(),
        errors = result.errors.len(),
        "parsed import file"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_preview(&result);
    if dry_run {
        println!("Dry run: nothing was saved.");
        return Ok(());
    }
    if result.entries.is_empty() {
        println!("No valid entries to import.");
        return Ok(());
    }

    let store = open_store()?;
    let checksum = compute_checksum(&file_path)?;
    if !force && is_duplicate_file(store.conn(), store.owner(), &checksum)? {
        println!("This file has already been imported. Use --force to import it again.");
        return Ok(());
    }

    let summary = submit_and_record(&store, &file_path, &result.entries, &checksum);

    if summary.succeeded > 0 {
        println!(
            "{}",
            format!(
                "Imported {} {}",
                summary.succeeded,
                if summary.succeeded == 1 { "entry" } else { "entries" }
            )
            .green()
        );
    }
    if summary.failed > 0 {
        let shown: Vec<&str> = summary
            .failures
            .iter()
            .take(FAILURES_SHOWN)
            .map(String::as_str)
            .collect();
        let more = if summary.failed > FAILURES_SHOWN { "..." } else { "" };
        println!(
            "{}",
            format!(
                "Failed to import {} {}: {}{more}",
                summary.failed,
                if summary.failed == 1 { "entry" } else { "entries" },
                shown.join("; ")
            )
            .red()
        );
    }
    Ok(())
}
