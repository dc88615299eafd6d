//! End-to-end tests of the parse pipeline and report history.
//!
//! Inputs are synthetic COT export lines built by `common`; every number
//! asserted here can be checked by hand from the figures passed in.

mod common;

use common::*;
use cotwatch::adapters::json_history_adapter::JsonHistoryAdapter;
use cotwatch::adapters::memory_history_adapter::MemoryHistoryAdapter;
use cotwatch::domain::error::CotError;
use cotwatch::domain::parser::{ingest, parse_report};
use cotwatch::domain::snapshot::Signal;
use cotwatch::domain::trend::{compare_reports, instrument_trend};
use cotwatch::ports::history_port::HistoryPort;

fn parse_one(content: &str) -> Result<cotwatch::domain::report::Report, CotError> {
    parse_report(&[content], &sample_table())
}

mod single_instrument {
    use super::*;

    #[test]
    fn usd_index_strong_long() {
        let report = parse_one(&file_of(&[usd_week("2024-01-09")])).unwrap();

        assert_eq!(report.date, "2024-01-09");
        assert_eq!(report.instruments.len(), 1);
        let usd = &report.instruments[0];
        assert_eq!(usd.code, "098662");
        assert_eq!(usd.display_name, "USD Index");
        assert_eq!(usd.net_position, 8000);
        assert_eq!(usd.net_value, 8_000_000.0);
        assert_eq!(usd.net_percent, 16.0);
        assert_eq!(usd.prior_net_percent, 14.7);
        assert_eq!(usd.delta, 1.3);
        assert_eq!(usd.signal, Signal::StrongLong);
        assert!(!usd.is_flip);
    }

    #[test]
    fn sign_change_is_a_flip() {
        // net +5000 now, prior long 25000 vs short 35000
        let line = tff_line("2024-01-09", "099741", [100000, 40000, 35000, 0, 15000, 0]);
        let report = parse_one(&file_of(&[line])).unwrap();
        let euro = report.get("099741").unwrap();

        assert_eq!(euro.net_percent, 5.0);
        assert_eq!(euro.prior_net_percent, -10.0);
        assert_eq!(euro.delta, 15.0);
        assert!(euro.is_flip);
        assert_eq!(euro.signal, Signal::CotFlip);
        assert_eq!(report.flips().count(), 1);
    }

    #[test]
    fn commodity_uses_disaggregated_columns() {
        let line = disagg_line("2024-01-09", "067651", [200000, 30000, 50000, -5000, -2000, 1000]);
        let report = parse_one(&file_of(&[line])).unwrap();
        let oil = report.get("067651").unwrap();

        // net -20000 on 200000; prior -17000 on 205000
        assert_eq!(oil.net_position, -20000);
        assert_eq!(oil.net_value, -20_000_000.0);
        assert_eq!(oil.net_percent, -10.0);
        assert_eq!(oil.prior_net_percent, -8.3);
        assert_eq!(oil.signal, Signal::StrongShort);
    }

    #[test]
    fn parsing_is_idempotent() {
        let content = file_of(&[
            usd_week("2024-01-09"),
            disagg_line("2024-01-09", "088691", [500000, 200000, 50000, 0, 0, 0]),
        ]);
        assert_eq!(parse_one(&content).unwrap(), parse_one(&content).unwrap());
    }
}

mod filtering {
    use super::*;

    #[test]
    fn unknown_codes_and_zero_open_interest_are_skipped() {
        let content = file_of(&[
            tff_line("2024-01-09", "999999", [80000, 1000, 2000, 0, 0, 0]),
            tff_line("2024-01-09", "13874A", [0, 1000, 2000, 0, 0, 0]),
            usd_week("2024-01-09"),
        ]);
        let report = parse_one(&content).unwrap();

        assert_eq!(report.instruments.len(), 1);
        assert!(report.get("13874A").is_none());
        assert!(report.get("098662").is_some());
    }

    #[test]
    fn blank_lines_are_ignored() {
        let content = format!("\n\n{}\n\n", usd_week("2024-01-09"));
        assert_eq!(parse_one(&content).unwrap().instruments.len(), 1);
    }

    #[test]
    fn no_matches_is_an_error() {
        let content = file_of(&[tff_line("2024-01-09", "999999", [1, 1, 0, 0, 0, 0])]);
        assert!(matches!(parse_one(&content), Err(CotError::NoInstruments)));
        assert!(matches!(parse_one(""), Err(CotError::NoInstruments)));
    }

    #[test]
    fn first_duplicate_record_wins() {
        let content = file_of(&[
            usd_week("2024-01-09"),
            tff_line("2024-01-09", "098662", [50000, 10000, 30000, 0, 0, 0]),
        ]);
        let report = parse_one(&content).unwrap();

        assert_eq!(report.instruments.len(), 1);
        assert_eq!(report.instruments[0].net_position, 8000);
    }
}

mod ordering {
    use super::*;

    #[test]
    fn sorted_by_net_percent_descending() {
        let content = file_of(&[
            tff_line("2024-01-09", "099741", [100000, 10000, 30000, 0, 0, 0]),
            usd_week("2024-01-09"),
            tff_line("2024-01-09", "13874A", [100000, 40000, 35000, 0, 0, 0]),
        ]);
        let report = parse_one(&content).unwrap();
        let codes: Vec<_> = report.instruments.iter().map(|s| s.code.as_str()).collect();

        assert_eq!(codes, vec!["098662", "13874A", "099741"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let content = file_of(&[
            tff_line("2024-01-09", "13874A", [100000, 40000, 35000, 0, 0, 0]),
            tff_line("2024-01-09", "099741", [200000, 60000, 50000, 0, 0, 0]),
        ]);
        let report = parse_one(&content).unwrap();
        let codes: Vec<_> = report.instruments.iter().map(|s| s.code.as_str()).collect();

        assert_eq!(codes, vec!["13874A", "099741"]);
    }

    #[test]
    fn multiple_files_merge_into_one_report() {
        let financial = file_of(&[usd_week("2024-01-09")]);
        let commodity = file_of(&[disagg_line(
            "2024-01-09",
            "088691",
            [500000, 200000, 50000, 0, 0, 0],
        )]);
        let report = parse_report(&[financial.as_str(), commodity.as_str()], &sample_table()).unwrap();

        assert_eq!(report.instruments.len(), 2);
        assert_eq!(report.instruments[0].code, "088691");
        assert_eq!(report.instruments[0].net_percent, 30.0);
        assert_eq!(report.instruments[0].signal, Signal::Neutral);
        assert_eq!(report.instruments[1].code, "098662");
    }
}

mod history {
    use super::*;

    fn ingest_weeks(history: &dyn HistoryPort) {
        let table = sample_table();
        let weeks = [
            tff_line("2024-01-02", "099741", [100000, 25000, 35000, 0, 0, 0]),
            tff_line("2024-01-09", "099741", [100000, 40000, 35000, 0, 15000, 0]),
            tff_line("2024-01-16", "099741", [100000, 45000, 35000, 0, 5000, 0]),
        ];
        for week in &weeks {
            ingest(history, &[week.as_str()], &table).unwrap();
        }
    }

    fn assert_history(history: &dyn HistoryPort) {
        assert_eq!(
            history.list_dates().unwrap(),
            vec!["2024-01-16", "2024-01-09", "2024-01-02"]
        );
        assert_eq!(history.latest().unwrap().unwrap().date, "2024-01-16");

        let recent = history.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].date, "2024-01-09");
    }

    #[test]
    fn memory_history() {
        let history = MemoryHistoryAdapter::new();
        ingest_weeks(&history);
        assert_history(&history);
    }

    #[test]
    fn json_history_persists_across_adapters() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cot_history.json");
        ingest_weeks(&JsonHistoryAdapter::new(path.clone()));
        assert_history(&JsonHistoryAdapter::new(path));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_history() {
        use cotwatch::adapters::sqlite_history_adapter::SqliteHistoryAdapter;
        let history = SqliteHistoryAdapter::in_memory().unwrap();
        ingest_weeks(&history);
        assert_history(&history);
    }

    #[test]
    fn subnormal_open_interest_keeps_json_history_readable() {
        let dir = tempfile::TempDir::new().unwrap();
        let history = JsonHistoryAdapter::new(dir.path().join("cot_history.json"));
        let mut fields: Vec<String> = usd_week("2024-01-09").split(',').map(String::from).collect();
        fields[7] = "1e-320".into();
        let line = fields.join(",");

        let report = ingest(&history, &[line.as_str()], &sample_table()).unwrap();
        assert_eq!(report.instruments[0].net_percent, 0.0);

        assert_eq!(history.list_dates().unwrap(), vec!["2024-01-09"]);
        let stored = history.get("2024-01-09").unwrap().unwrap();
        assert_eq!(stored, report);
    }

    #[test]
    fn reingesting_a_date_replaces_it() {
        let history = MemoryHistoryAdapter::new();
        let table = sample_table();
        ingest(&history, &[usd_week("2024-01-09").as_str()], &table).unwrap();
        let euro = tff_line("2024-01-09", "099741", [100000, 40000, 35000, 0, 0, 0]);
        ingest(&history, &[euro.as_str()], &table).unwrap();

        assert_eq!(history.len(), 1);
        let stored = history.get("2024-01-09").unwrap().unwrap();
        assert!(stored.get("099741").is_some());
        assert!(stored.get("098662").is_none());
    }

    #[test]
    fn failed_parse_stores_nothing() {
        let history = MemoryHistoryAdapter::new();
        let result = ingest(&history, &["no data here"], &sample_table());
        assert!(matches!(result, Err(CotError::NoInstruments)));
        assert!(history.is_empty());
    }

    #[test]
    fn trend_and_week_over_week_changes() {
        let history = MemoryHistoryAdapter::new();
        ingest_weeks(&history);

        let reports = history.recent(10).unwrap();
        let trend = instrument_trend(&reports, "099741");
        let dates: Vec<_> = trend.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-09", "2024-01-16"]);
        assert_eq!(trend[0].net_percent, -10.0);
        assert_eq!(trend[1].signal, Signal::CotFlip);
        assert_eq!(trend[2].net_percent, 10.0);
        assert_eq!(trend[2].signal, Signal::StrongLong);

        let changes = compare_reports(&reports[1], &reports[2]);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].crossed_zero);
        assert!(changes[0].signal_changed());
        assert_eq!(changes[0].net_percent_change, Some(15.0));
    }
}
