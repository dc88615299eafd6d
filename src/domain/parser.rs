//! COT parse pipeline: locate → resolve layout → compute → assemble.
//!
//! Pure and synchronous. Callers read the source files and decide whether to
//! persist; [`ingest`] does both steps against a [`HistoryPort`].

use crate::domain::error::CotError;
use crate::domain::instrument::InstrumentTable;
use crate::domain::locator::{LocatedRecord, locate_in_sources};
use crate::domain::report::{Report, assemble_report, normalize_date};
use crate::domain::snapshot::{InstrumentSnapshot, compute_snapshot};
use crate::ports::history_port::HistoryPort;
use std::collections::HashSet;

/// Parse one or more export files into a dated report.
///
/// The date is captured from the first accepted record and normalized to
/// zero-padded ISO when it parses as a date. If the same code
/// appears more than once, the first accepted record is kept.
pub fn parse_report(sources: &[&str], table: &InstrumentTable) -> Result<Report, CotError> {
    let mut date: Option<String> = None;
    let mut seen = HashSet::new();
    let mut snapshots: Vec<InstrumentSnapshot> = Vec::new();

    for record in locate_in_sources(sources, table) {
        if date.is_none() {
            date = Some(normalize_date(record.date()));
        }
        if !seen.insert(record.spec.code.clone()) {
            tracing::warn!(code = %record.spec.code, "duplicate instrument record ignored");
            continue;
        }
        snapshots.push(snapshot_for(&record));
    }

    let report = assemble_report(date.unwrap_or_default(), snapshots)?;
    tracing::debug!(
        date = %report.date,
        instruments = report.instruments.len(),
        "assembled COT report"
    );
    Ok(report)
}

fn snapshot_for(record: &LocatedRecord<'_>) -> InstrumentSnapshot {
    compute_snapshot(record.spec, &record.fields, record.spec.strategy())
}

/// Parse and store. The history receives exactly one `put` per successful parse.
pub fn ingest(
    history: &dyn HistoryPort,
    sources: &[&str],
    table: &InstrumentTable,
) -> Result<Report, CotError> {
    let report = parse_report(sources, table)?;
    history.put(&report)?;
    tracing::info!(
        date = %report.date,
        instruments = report.instruments.len(),
        "stored COT report"
    );
    Ok(report)
}
