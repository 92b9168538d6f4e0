use comfy_table::{Cell, CellAlignment, Table};

use crate::analytics::{monthly_totals, overall_totals, yearly_totals};
use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::rupees;
use crate::store::VisitStore;

fn totals_table(rows: impl Iterator<Item = (String, u64, u64, u64)>, period: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![period, "Hospital Rs", "Medicine Rs", "Total Rs"]);
    for (label, hospital, medicine, total) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(rupees(hospital)).set_alignment(CellAlignment::Right),
            Cell::new(rupees(medicine)).set_alignment(CellAlignment::Right),
            Cell::new(rupees(total)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn monthly(json: bool) -> Result<()> {
    let entries = open_store()?.list_entries()?;
    let months = monthly_totals(&entries);
    if json {
        println!("{}", serde_json::to_string_pretty(&months)?);
        return Ok(());
    }
    if months.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }
    let rows = months
        .into_iter()
        .map(|m| (m.label, m.hospital_rs, m.medicine_rs, m.total));
    println!("{}", totals_table(rows, "Month"));
    Ok(())
}

pub fn yearly(json: bool) -> Result<()> {
    let entries = open_store()?.list_entries()?;
    let years = yearly_totals(&entries);
    if json {
        println!("{}", serde_json::to_string_pretty(&years)?);
        return Ok(());
    }
    if years.is_empty() {
        println!("No entries yet.");
        return Ok(());
    }
    let rows = years
        .into_iter()
        .map(|y| (y.label, y.hospital_rs, y.medicine_rs, y.total));
    println!("{}", totals_table(rows, "Year"));
    Ok(())
}

pub fn summary() -> Result<()> {
    let entries = open_store()?.list_entries()?;
    let t = overall_totals(&entries);
    println!("Entries:           {}", t.entries);
    println!("Hospital charges:  {}", rupees(t.hospital_rs));
    println!("Medicine charges:  {}", rupees(t.medicine_rs));
    println!("Total:             {}", rupees(t.total));
    Ok(())
}
