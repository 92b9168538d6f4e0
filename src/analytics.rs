use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::VisitEntry;

// ---------------------------------------------------------------------------
// Monthly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// `YYYY-MM`
    pub period: String,
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub hospital_rs: u64,
    pub medicine_rs: u64,
    pub total: u64,
    /// e.g. `Jan 2024`
    pub label: String,
}

pub fn monthly_totals(entries: &[VisitEntry]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<(i32, u32), MonthlyTotal> = BTreeMap::new();
    for entry in entries {
        let day = entry.visit_day();
        let (year, month) = (day.year(), day.month());
        let bucket = by_month.entry((year, month)).or_insert_with(|| MonthlyTotal {
            period: format!("{year:04}-{month:02}"),
            year,
            month,
            hospital_rs: 0,
            medicine_rs: 0,
            total: 0,
            label: NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b %Y").to_string())
                .unwrap_or_default(),
        });
        bucket.hospital_rs = bucket.hospital_rs.saturating_add(entry.hospital_rs);
        bucket.medicine_rs = bucket.medicine_rs.saturating_add(entry.medicine_rs);
        bucket.total = bucket.total.saturating_add(entry.total_rs());
    }
    by_month.into_values().collect()
}

// ---------------------------------------------------------------------------
// Yearly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTotal {
    pub year: i32,
    pub hospital_rs: u64,
    pub medicine_rs: u64,
    pub total: u64,
    pub label: String,
}

pub fn yearly_totals(entries: &[VisitEntry]) -> Vec<YearlyTotal> {
    let mut by_year: BTreeMap<i32, YearlyTotal> = BTreeMap::new();
    for entry in entries {
        let year = entry.visit_day().year();
        let bucket = by_year.entry(year).or_insert_with(|| YearlyTotal {
            year,
            hospital_rs: 0,
            medicine_rs: 0,
            total: 0,
            label: year.to_string(),
        });
        bucket.hospital_rs = bucket.hospital_rs.saturating_add(entry.hospital_rs);
        bucket.medicine_rs = bucket.medicine_rs.saturating_add(entry.medicine_rs);
        bucket.total = bucket.total.saturating_add(entry.total_rs());
    }
    by_year.into_values().collect()
}

// ---------------------------------------------------------------------------
// Overall
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub entries: usize,
    pub hospital_rs: u64,
    pub medicine_rs: u64,
    pub total: u64,
}

pub fn overall_totals(entries: &[VisitEntry]) -> Totals {
    entries.iter().fold(Totals::default(), |acc, e| Totals {
        entries: acc.entries + 1,
        hospital_rs: acc.hospital_rs.saturating_add(e.hospital_rs),
        medicine_rs: acc.medicine_rs.saturating_add(e.medicine_rs),
        total: acc.total.saturating_add(e.total_rs()),
    })
}
