//! JSON file report history.
//!
//! The whole history is one JSON object keyed by report date. Every `put`
//! rewrites the file through a temporary sibling and a rename, so a crash
//! mid-write leaves the previous history intact.

use crate::domain::error::CotError;
use crate::domain::report::Report;
use crate::ports::history_port::HistoryPort;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

type HistoryMap = BTreeMap<String, Report>;

pub struct JsonHistoryAdapter {
    path: PathBuf,
    pretty: bool,
}

impl JsonHistoryAdapter {
    /// Pretty-printed by default.
    pub fn new(path: PathBuf) -> Self {
        Self { path, pretty: true }
    }

    /// Write compact single-line JSON when `pretty` is false.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HistoryMap, CotError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HistoryMap::new()),
            Err(e) => {
                return Err(CotError::History {
                    reason: format!("failed to read {}: {}", self.path.display(), e),
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(HistoryMap::new());
        }
        serde_json::from_str(&content).map_err(|e| CotError::History {
            reason: format!("corrupt history file {}: {}", self.path.display(), e),
        })
    }

    fn save(&self, map: &HistoryMap) -> Result<(), CotError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(map)?
        } else {
            serde_json::to_string(map)?
        };
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| CotError::History {
            reason: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| CotError::History {
            reason: format!("failed to replace {}: {}", self.path.display(), e),
        })?;
        tracing::debug!(path = %self.path.display(), reports = map.len(), "wrote history file");
        Ok(())
    }
}

impl HistoryPort for JsonHistoryAdapter {
    fn put(&self, report: &Report) -> Result<(), CotError> {
        let mut map = self.load()?;
        map.insert(report.date.clone(), report.clone());
        self.save(&map)
    }

    fn get(&self, date: &str) -> Result<Option<Report>, CotError> {
        Ok(self.load()?.remove(date))
    }

    fn list_dates(&self) -> Result<Vec<String>, CotError> {
        Ok(self.load()?.into_keys().rev().collect())
    }

    fn latest(&self) -> Result<Option<Report>, CotError> {
        Ok(self.load()?.pop_last().map(|(_, report)| report))
    }

    fn recent(&self, n: usize) -> Result<Vec<Report>, CotError> {
        Ok(self.load()?.into_values().rev().take(n).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::{InstrumentSnapshot, Signal};
    use tempfile::TempDir;

    fn report(date: &str, net_percent: f64) -> Report {
        Report {
            date: date.into(),
            instruments: vec![InstrumentSnapshot {
                code: "099741".into(),
                display_name: "Euro FX".into(),
                net_position: 42000,
                net_value: 5_250_000_000.0,
                net_percent,
                prior_net_percent: 7.5,
                delta: net_percent - 7.5,
                signal: Signal::StrongLong,
                is_flip: false,
            }],
        }
    }

    fn adapter() -> (TempDir, JsonHistoryAdapter) {
        let dir = TempDir::new().unwrap();
        let adapter = JsonHistoryAdapter::new(dir.path().join("history.json"));
        (dir, adapter)
    }

    #[test]
    fn missing_file_is_empty_history() {
        let (_dir, history) = adapter();
        assert!(history.list_dates().unwrap().is_empty());
        assert_eq!(history.latest().unwrap(), None);
        assert_eq!(history.get("2024-01-09").unwrap(), None);
    }

    #[test]
    fn put_then_get_round_trips() {
        let (_dir, history) = adapter();
        let r = report("2024-01-09", 9.0);
        history.put(&r).unwrap();
        assert_eq!(history.get("2024-01-09").unwrap(), Some(r));
        assert!(history.path().exists());
    }

    #[test]
    fn put_overwrites_same_date() {
        let (_dir, history) = adapter();
        history.put(&report("2024-01-09", 9.0)).unwrap();
        history.put(&report("2024-01-09", 11.0)).unwrap();

        assert_eq!(history.list_dates().unwrap(), vec!["2024-01-09"]);
        let stored = history.get("2024-01-09").unwrap().unwrap();
        assert_eq!(stored.instruments[0].net_percent, 11.0);
    }

    #[test]
    fn ordering_queries_are_newest_first() {
        let (_dir, history) = adapter();
        for d in ["2024-01-02", "2024-01-16", "2024-01-09"] {
            history.put(&report(d, 1.0)).unwrap();
        }
        assert_eq!(
            history.list_dates().unwrap(),
            vec!["2024-01-16", "2024-01-09", "2024-01-02"]
        );
        assert_eq!(history.latest().unwrap().unwrap().date, "2024-01-16");
        let recent: Vec<_> = history.recent(2).unwrap().into_iter().map(|r| r.date).collect();
        assert_eq!(recent, vec!["2024-01-16", "2024-01-09"]);
        assert_eq!(history.recent(10).unwrap().len(), 3);
    }

    #[test]
    fn history_survives_a_new_adapter() {
        let (dir, history) = adapter();
        history.put(&report("2024-01-09", 9.0)).unwrap();
        drop(history);

        let reopened = JsonHistoryAdapter::new(dir.path().join("history.json"));
        assert_eq!(reopened.list_dates().unwrap(), vec!["2024-01-09"]);
    }

    #[test]
    fn file_is_keyed_by_date() {
        let (_dir, history) = adapter();
        history.put(&report("2024-01-09", 9.0)).unwrap();
        let raw = fs::read_to_string(history.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["2024-01-09"]["instruments"][0]["code"], "099741");
        assert_eq!(value["2024-01-09"]["instruments"][0]["signal"], "STRONG_LONG");
    }

    #[test]
    fn compact_output_is_one_line() {
        let (dir, pretty) = adapter();
        pretty.put(&report("2024-01-09", 9.0)).unwrap();
        assert!(fs::read_to_string(pretty.path()).unwrap().lines().count() > 1);

        let compact = JsonHistoryAdapter::new(dir.path().join("compact.json")).with_pretty(false);
        compact.put(&report("2024-01-09", 9.0)).unwrap();
        let raw = fs::read_to_string(compact.path()).unwrap();
        assert_eq!(raw.lines().count(), 1);
        assert_eq!(compact.get("2024-01-09").unwrap(), pretty.get("2024-01-09").unwrap());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, history) = adapter();
        fs::write(history.path(), "{not json").unwrap();
        let err = history.list_dates().unwrap_err();
        assert!(matches!(err, CotError::History { .. }));
    }
}
