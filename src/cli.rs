//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_history_adapter::JsonHistoryAdapter;
use crate::adapters::memory_history_adapter::MemoryHistoryAdapter;
use crate::domain::config_validation::{
    DEFAULT_HISTORY_PATH, HistoryBackend, history_backend, load_instrument_table,
    validate_config,
};
use crate::domain::error::CotError;
use crate::domain::instrument::InstrumentTable;
use crate::domain::parser::{ingest, parse_report};
use crate::domain::report::{Report, normalize_date};
use crate::domain::trend::{SnapshotChange, TrendPoint, compare_reports, instrument_trend};
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "cotwatch", about = "Commitment-of-traders report parser and signal engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse COT export files and store the report
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the report without storing it
        #[arg(long)]
        no_store: bool,
    },
    /// Show a stored report (latest by default)
    Show {
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List stored report dates
    History {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Summarize the most recent reports
    Recent {
        #[arg(short = 'n', long, default_value_t = 4)]
        count: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the positioning series for one instrument
    Trend {
        #[arg(long)]
        code: String,
        #[arg(short = 'n', long, default_value_t = 12)]
        count: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Export a stored report as CSV
    Export {
        /// Output file, or a directory with --all
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, conflicts_with = "all")]
        date: Option<String>,
        /// Write every stored report as <date>.csv into the output directory
        #[arg(long)]
        all: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the effective instrument table
    Instruments {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Parse {
            files,
            config,
            no_store,
        } => run_parse(&files, config.as_ref(), no_store),
        Command::Show { date, config } => run_show(date.as_deref(), config.as_ref()),
        Command::History { config } => run_history(config.as_ref()),
        Command::Recent { count, config } => run_recent(count, config.as_ref()),
        Command::Trend {
            code,
            count,
            config,
        } => run_trend(&code, count, config.as_ref()),
        Command::Export {
            output,
            date,
            all,
            config,
        } => {
            if all {
                run_export_all(&output, config.as_ref())
            } else {
                run_export(&output, date.as_deref(), config.as_ref())
            }
        }
        Command::Instruments { config } => run_instruments(config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, CotError> {
    match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| CotError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn open_history(config: &dyn ConfigPort) -> Result<Box<dyn HistoryPort>, CotError> {
    match history_backend(config)? {
        HistoryBackend::Json => {
            let path = config
                .get_string("history", "path")
                .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string());
            let pretty = config.get_bool("history", "pretty", true);
            tracing::debug!("Using JSON history at {path}");
            Ok(Box::new(
                JsonHistoryAdapter::new(PathBuf::from(path)).with_pretty(pretty),
            ))
        }
        HistoryBackend::Memory => Ok(Box::new(MemoryHistoryAdapter::new())),
        HistoryBackend::Sqlite => open_sqlite_history(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite_history(config: &dyn ConfigPort) -> Result<Box<dyn HistoryPort>, CotError> {
    use crate::adapters::sqlite_history_adapter::SqliteHistoryAdapter;
    Ok(Box::new(SqliteHistoryAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite_history(_config: &dyn ConfigPort) -> Result<Box<dyn HistoryPort>, CotError> {
    Err(CotError::ConfigInvalid {
        section: "history".into(),
        key: "backend".into(),
        reason: "sqlite feature is required for the sqlite backend".into(),
    })
}

pub fn read_sources(files: &[PathBuf]) -> Result<Vec<String>, CotError> {
    files
        .iter()
        .map(|path| {
            fs::read_to_string(path).map_err(|e| {
                CotError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read {}: {}", path.display(), e),
                ))
            })
        })
        .collect()
}

/// Parse the given files and, unless `history` is `None`, store the result.
pub fn parse_files(
    files: &[PathBuf],
    table: &InstrumentTable,
    history: Option<&dyn HistoryPort>,
) -> Result<Report, CotError> {
    let contents = read_sources(files)?;
    let sources: Vec<&str> = contents.iter().map(String::as_str).collect();
    tracing::info!(
        "Parsing {} file(s) against {} instruments",
        sources.len(),
        table.len()
    );
    match history {
        Some(history) => ingest(history, &sources, table),
        None => parse_report(&sources, table),
    }
}

fn run_parse(files: &[PathBuf], config_path: Option<&PathBuf>, no_store: bool) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let table = load_instrument_table(&config)?;

    let report = if no_store {
        parse_files(files, &table, None)?
    } else {
        let history = open_history(&config)?;
        parse_files(files, &table, Some(history.as_ref()))?
    };

    print!("{}", format_report(&report));
    let flips: Vec<_> = report.flips().map(|s| s.display_name.as_str()).collect();
    if !flips.is_empty() {
        println!("\nCOT flips: {}", flips.join(", "));
    }
    Ok(())
}

/// Resolve an explicit date or the latest stored report.
///
/// The date is normalized the same way stored keys are, so `2024-1-9` and
/// `01/09/2024` both find `2024-01-09`.
pub fn fetch_report(history: &dyn HistoryPort, date: Option<&str>) -> Result<Report, CotError> {
    let found = match date {
        Some(d) => history.get(&normalize_date(d))?,
        None => history.latest()?,
    };
    found.ok_or_else(|| CotError::ReportNotFound {
        date: date.unwrap_or("latest").to_string(),
    })
}

/// The stored report immediately before `date`, if any.
pub fn previous_report(history: &dyn HistoryPort, date: &str) -> Result<Option<Report>, CotError> {
    match history.list_dates()?.into_iter().find(|d| d.as_str() < date) {
        Some(prev) => history.get(&prev),
        None => Ok(None),
    }
}

fn run_show(date: Option<&str>, config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let history = open_history(&config)?;
    let report = fetch_report(history.as_ref(), date)?;

    print!("{}", format_report(&report));

    if let Some(previous) = previous_report(history.as_ref(), &report.date)? {
        let changes = compare_reports(&report, &previous);
        print!("{}", format_changes(&previous.date, &changes));
    }
    Ok(())
}

fn run_history(config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let history = open_history(&config)?;
    let dates = history.list_dates()?;

    if dates.is_empty() {
        eprintln!("No stored reports");
    } else {
        for date in &dates {
            println!("{date}");
        }
        eprintln!("{} reports stored", dates.len());
    }
    Ok(())
}

fn run_recent(count: usize, config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let history = open_history(&config)?;

    for report in history.recent(count)? {
        println!("{}", summarize_report(&report));
    }
    Ok(())
}

fn run_trend(code: &str, count: usize, config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let history = open_history(&config)?;
    let code = code.trim().to_uppercase();

    let reports = history.recent(count)?;
    let trend = instrument_trend(&reports, &code);
    if trend.is_empty() {
        return Err(CotError::ReportNotFound {
            date: format!("any date with instrument {code}"),
        });
    }
    print!("{}", format_trend(&code, &trend));
    Ok(())
}

fn run_export(output: &Path, date: Option<&str>, config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let history = open_history(&config)?;
    let report = fetch_report(history.as_ref(), date)?;

    CsvReportAdapter.write(&report, output)?;
    eprintln!("Report {} written to: {}", report.date, output.display());
    Ok(())
}

fn run_export_all(output_dir: &Path, config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let history = open_history(&config)?;
    let written = export_all(history.as_ref(), &CsvReportAdapter, output_dir)?;
    eprintln!("{written} reports written to: {}", output_dir.display());
    Ok(())
}

/// Write every stored report into `output_dir`, one file per date.
pub fn export_all(
    history: &dyn HistoryPort,
    writer: &dyn ReportPort,
    output_dir: &Path,
) -> Result<usize, CotError> {
    let reports = history.recent(usize::MAX)?;
    if reports.is_empty() {
        return Err(CotError::ReportNotFound {
            date: "any date".into(),
        });
    }
    fs::create_dir_all(output_dir)?;
    writer.write_all(&reports, output_dir)?;
    tracing::info!(
        "Exported {} reports as .{} files",
        reports.len(),
        writer.extension()
    );
    Ok(reports.len())
}

fn run_instruments(config_path: Option<&PathBuf>) -> Result<(), CotError> {
    let config = load_config(config_path)?;
    let table = load_instrument_table(&config)?;

    for spec in table.iter() {
        println!(
            "{:<8} {:<22} {:>14} {}",
            spec.code, spec.display_name, spec.contract_size, spec.category
        );
    }
    eprintln!("{} instruments", table.len());
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), CotError> {
    let config = load_config(Some(config_path))?;
    validate_config(&config)?;
    eprintln!("Configuration is valid.");
    Ok(())
}

pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "COT report {} ({} instruments)",
        report.date,
        report.instruments.len()
    );
    let _ = writeln!(
        out,
        "{:<8} {:<22} {:>10} {:>8} {:>8} {:>7}  {}",
        "CODE", "NAME", "NET POS", "NET %", "PRIOR %", "DELTA", "SIGNAL"
    );
    for s in &report.instruments {
        let _ = writeln!(
            out,
            "{:<8} {:<22} {:>10} {:>8.1} {:>8.1} {:>+7.1}  {}",
            s.code, s.display_name, s.net_position, s.net_percent, s.prior_net_percent, s.delta, s.signal
        );
    }
    out
}

pub fn format_changes(previous_date: &str, changes: &[SnapshotChange]) -> String {
    let mut out = String::new();
    let notable: Vec<_> = changes
        .iter()
        .filter(|c| c.signal_changed() || c.crossed_zero)
        .collect();
    if notable.is_empty() {
        return out;
    }
    let _ = writeln!(out, "\nChanges since {previous_date}:");
    for c in notable {
        let previous = c.previous_signal.map(|s| s.as_str()).unwrap_or("-");
        let crossed = if c.crossed_zero { " (net crossed zero)" } else { "" };
        let _ = writeln!(
            out,
            "  {:<22} {} -> {}{}",
            c.display_name, previous, c.signal, crossed
        );
    }
    out
}

pub fn format_trend(code: &str, trend: &[TrendPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Trend for {code}");
    for p in trend {
        let flip = if p.is_flip { " *" } else { "" };
        let _ = writeln!(
            out,
            "{}  {:>10} {:>8.1} {:>+7.1}  {}{}",
            p.date, p.net_position, p.net_percent, p.delta, p.signal, flip
        );
    }
    out
}

pub fn summarize_report(report: &Report) -> String {
    let top_long = report.instruments.first();
    let top_short = report.instruments.last();
    let name = |s: Option<&crate::domain::snapshot::InstrumentSnapshot>| {
        s.map(|s| format!("{} {:+.1}%", s.display_name, s.net_percent))
            .unwrap_or_else(|| "-".into())
    };
    format!(
        "{}: {} instruments, {} flips, most long {}, most short {}",
        report.date,
        report.instruments.len(),
        report.flips().count(),
        name(top_long),
        name(top_short)
    )
}
