//! Report history port trait.

use crate::domain::error::CotError;
use crate::domain::report::Report;

/// Date-keyed store of past reports.
///
/// Dates are ISO strings, so descending lexicographic order is descending
/// chronological order.
pub trait HistoryPort {
    /// Store a report, replacing any existing entry for the same date.
    fn put(&self, report: &Report) -> Result<(), CotError>;

    fn get(&self, date: &str) -> Result<Option<Report>, CotError>;

    /// All stored dates, newest first.
    fn list_dates(&self) -> Result<Vec<String>, CotError>;

    /// Default implementation: the report for the highest date key.
    fn latest(&self) -> Result<Option<Report>, CotError> {
        match self.list_dates()?.into_iter().next() {
            Some(date) => self.get(&date),
            None => Ok(None),
        }
    }

    /// Default implementation: up to `n` reports, newest first.
    fn recent(&self, n: usize) -> Result<Vec<Report>, CotError> {
        let mut reports = Vec::new();
        for date in self.list_dates()?.into_iter().take(n) {
            if let Some(report) = self.get(&date)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }
}
