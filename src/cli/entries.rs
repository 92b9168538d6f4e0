use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_store, EntryArgs};
use crate::error::{MedlogError, Result};
use crate::fmt::rupees;
use crate::form::VisitForm;
use crate::models::VisitEntry;
use crate::store::VisitStore;

impl EntryArgs {
    /// Overlay the given values on `form`; absent flags keep the form's value.
    fn apply(self, form: &mut VisitForm) {
        let pairs = [
            (self.hospital, &mut form.hospital_name),
            (self.date, &mut form.visit_date),
            (self.doctor, &mut form.doctor_name),
            (self.patient, &mut form.patient_name),
            (self.hospital_rs, &mut form.hospital_rs),
            (self.medicine_rs, &mut form.medicine_rs),
            (self.medicine, &mut form.medicine_name),
            (self.address, &mut form.address),
        ];
        for (value, slot) in pairs {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

fn validated(form: &VisitForm) -> Result<crate::models::VisitInput> {
    form.validate().map_err(|errors| {
        for e in &errors {
            eprintln!("  {} {e}", "✗".red());
        }
        MedlogError::Validation(format!("{} field(s) need attention", errors.len()))
    })
}

pub fn add(args: EntryArgs) -> Result<()> {
    let store = open_store()?;
    let mut form = VisitForm::default();
    args.apply(&mut form);
    let input = validated(&form)?;
    let id = store.create_entry(&input)?;
    println!("Added entry {id}: {} on {}", input.hospital_name, form.visit_date.trim());
    Ok(())
}

pub fn edit(id: i64, args: EntryArgs) -> Result<()> {
    let store = open_store()?;
    let existing = store.get_entry(id)?;
    let mut form = VisitForm::from_entry(&existing);
    args.apply(&mut form);
    let input = validated(&form)?;
    store.edit_entry(id, &input)?;
    println!("Updated entry {id}");
    Ok(())
}

pub fn delete(id: i64, confirm: &str) -> Result<()> {
    let store = open_store()?;
    store.delete_entry(id, confirm)?;
    println!("Deleted entry {id}");
    Ok(())
}

pub(crate) fn entries_table(entries: &[VisitEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Date", "Hospital", "Doctor", "Patient", "Hospital Rs", "Medicine Rs", "Total Rs",
    ]);
    for e in entries {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(e.visit_day().format("%Y-%m-%d")),
            Cell::new(&e.hospital_name),
            Cell::new(&e.doctor_name),
            Cell::new(&e.patient_name),
            Cell::new(rupees(e.hospital_rs)).set_alignment(CellAlignment::Right),
            Cell::new(rupees(e.medicine_rs)).set_alignment(CellAlignment::Right),
            Cell::new(rupees(e.total_rs())).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn list(json: bool) -> Result<()> {
    let store = open_store()?;
    let entries = store.list_entries()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No entries yet. Add one with `medlog add` or `medlog import`.");
        return Ok(());
    }

    let noun = if entries.len() == 1 { "entry" } else { "entries" };
    println!("{}\n{} {noun} recorded", entries_table(&entries), entries.len());
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let store = open_store()?;
    let e = store.get_entry(id)?;

    let mut table = Table::new();
    let rows: [(&str, String); 9] = [
        ("Visit Date", e.visit_day().format("%Y-%m-%d").to_string()),
        ("Hospital Name", e.hospital_name.clone()),
        ("Doctor Name", e.doctor_name.clone()),
        ("Patient Name", e.patient_name.clone()),
        ("Hospital Charges", rupees(e.hospital_rs)),
        ("Medicine Charges", rupees(e.medicine_rs)),
        ("Total Charges", rupees(e.total_rs())),
        ("Medicine Name", e.medicine_name.clone()),
        ("Address", e.address.clone()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label.bold()), Cell::new(value)]);
    }
    println!("Entry {}\n{table}", e.id);
    Ok(())
}
