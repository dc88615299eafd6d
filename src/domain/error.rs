//! Domain error types.

/// Top-level error type for cotwatch.
#[derive(Debug, thiserror::Error)]
pub enum CotError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no recognized instruments found in input")]
    NoInstruments,

    #[error("no stored report for {date}")]
    ReportNotFound { date: String },

    #[error("history store error: {reason}")]
    History { reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CotError> for std::process::ExitCode {
    fn from(err: &CotError) -> Self {
        let code: u8 = match err {
            CotError::Io(_) => 1,
            CotError::ConfigParse { .. }
            | CotError::ConfigMissing { .. }
            | CotError::ConfigInvalid { .. } => 2,
            CotError::Database { .. }
            | CotError::DatabaseQuery { .. }
            | CotError::History { .. }
            | CotError::Serialization(_) => 3,
            CotError::NoInstruments | CotError::ReportNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
