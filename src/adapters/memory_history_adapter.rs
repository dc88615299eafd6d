//! In-memory report history.

use crate::domain::error::CotError;
use crate::domain::report::Report;
use crate::ports::history_port::HistoryPort;
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryHistoryAdapter {
    reports: RefCell<BTreeMap<String, Report>>,
}

impl MemoryHistoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }
}

impl HistoryPort for MemoryHistoryAdapter {
    fn put(&self, report: &Report) -> Result<(), CotError> {
        self.reports
            .borrow_mut()
            .insert(report.date.clone(), report.clone());
        Ok(())
    }

    fn get(&self, date: &str) -> Result<Option<Report>, CotError> {
        Ok(self.reports.borrow().get(date).cloned())
    }

    fn list_dates(&self) -> Result<Vec<String>, CotError> {
        Ok(self.reports.borrow().keys().rev().cloned().collect())
    }

    fn latest(&self) -> Result<Option<Report>, CotError> {
        Ok(self.reports.borrow().values().next_back().cloned())
    }
}
