//! Report export port trait.

use crate::domain::error::CotError;
use crate::domain::report::Report;
use std::path::Path;

/// Port for writing a report to an external format.
pub trait ReportPort {
    fn write(&self, report: &Report, output_path: &Path) -> Result<(), CotError>;

    /// Default implementation: one file per report, named `<date>.<extension>`
    /// inside `output_dir`.
    fn write_all(&self, reports: &[Report], output_dir: &Path) -> Result<(), CotError> {
        for report in reports {
            let path = output_dir.join(format!("{}.{}", report.date, self.extension()));
            self.write(report, &path)?;
        }
        Ok(())
    }

    fn extension(&self) -> &'static str;
}
