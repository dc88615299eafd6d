//! CSV report export.

use crate::domain::error::CotError;
use crate::domain::report::Report;
use crate::ports::report_port::ReportPort;
use std::fs::File;
use std::path::Path;

pub const HEADER: [&str; 10] = [
    "date",
    "code",
    "name",
    "net_position",
    "net_value",
    "net_percent",
    "prior_net_percent",
    "delta",
    "signal",
    "flip",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    /// Write `report` as CSV rows to any writer, in report order.
    pub fn write_to<W: std::io::Write>(report: &Report, writer: W) -> Result<(), CotError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADER).map_err(csv_err)?;

        for s in &report.instruments {
            wtr.write_record([
                report.date.clone(),
                s.code.clone(),
                s.display_name.clone(),
                s.net_position.to_string(),
                format!("{:.0}", s.net_value),
                format!("{:.1}", s.net_percent),
                format!("{:.1}", s.prior_net_percent),
                format!("{:.1}", s.delta),
                s.signal.to_string(),
                s.is_flip.to_string(),
            ])
            .map_err(csv_err)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn csv_err(e: csv::Error) -> CotError {
    CotError::Io(std::io::Error::other(e))
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &Report, output_path: &Path) -> Result<(), CotError> {
        let file = File::create(output_path)?;
        Self::write_to(report, file)?;
        tracing::debug!(path = %output_path.display(), "wrote CSV report");
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}
