//! Dated COT report assembled from instrument snapshots.

use crate::domain::error::CotError;
use crate::domain::snapshot::InstrumentSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub date: String,
    pub instruments: Vec<InstrumentSnapshot>,
}

impl Report {
    pub fn get(&self, code: &str) -> Option<&InstrumentSnapshot> {
        self.instruments.iter().find(|s| s.code == code)
    }

    /// Instruments whose net position crossed zero this week.
    pub fn flips(&self) -> impl Iterator<Item = &InstrumentSnapshot> {
        self.instruments.iter().filter(|s| s.is_flip)
    }

    /// The report date as a calendar date, when it is in a recognized format.
    pub fn as_of(&self) -> Option<NaiveDate> {
        parse_report_date(&self.date)
    }
}

/// Date layouts seen in COT exports, tried in order.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Canonical history key for a date: zero-padded ISO when the date parses,
/// otherwise the trimmed raw text.
pub fn normalize_date(raw: &str) -> String {
    match parse_report_date(raw) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Sort snapshots descending by net percent into a report.
///
/// The sort is stable, so ties keep the order the records were located in.
/// An empty snapshot list means nothing in the input was recognized.
pub fn assemble_report(
    date: impl Into<String>,
    mut snapshots: Vec<InstrumentSnapshot>,
) -> Result<Report, CotError> {
    if snapshots.is_empty() {
        return Err(CotError::NoInstruments);
    }
    snapshots.sort_by(|a, b| {
        b.net_percent
            .partial_cmp(&a.net_percent)
            .unwrap_or(Ordering::Equal)
    });
    Ok(Report {
        date: date.into(),
        instruments: snapshots,
    })
}
