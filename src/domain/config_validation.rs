//! Configuration validation.
//!
//! Runs once at startup. Everything caught here is a configuration error,
//! never a per-record runtime condition.

use crate::domain::error::CotError;
use crate::domain::instrument::{Category, InstrumentSpec, InstrumentTable, UnknownCategory};
use crate::ports::config_port::ConfigPort;

pub const INSTRUMENT_SECTION_PREFIX: &str = "instrument.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Json,
    Sqlite,
    Memory,
}

pub const DEFAULT_HISTORY_PATH: &str = "cot_history.json";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CotError> {
    load_instrument_table(config)?;
    history_backend(config)?;
    Ok(())
}

/// Built-in table plus `[instrument.<CODE>]` overrides, filtered by `[cot] targets`.
pub fn load_instrument_table(config: &dyn ConfigPort) -> Result<InstrumentTable, CotError> {
    let mut table = InstrumentTable::builtin();

    for section in config.sections() {
        let Some(raw_code) = section.strip_prefix(INSTRUMENT_SECTION_PREFIX) else {
            continue;
        };
        let code = raw_code.trim().to_uppercase();
        table.upsert(instrument_from_section(config, &section, &code)?);
    }

    let targets: Vec<String> = config
        .get_list("cot", "targets")
        .into_iter()
        .map(|t| t.to_uppercase())
        .collect();
    if !targets.is_empty() {
        let missing = table.retain_targets(&targets);
        if !missing.is_empty() {
            return Err(CotError::ConfigInvalid {
                section: "cot".into(),
                key: "targets".into(),
                reason: format!("unknown instrument codes: {}", missing.join(", ")),
            });
        }
    }

    validate_instrument_table(&table)?;
    Ok(table)
}

fn instrument_from_section(
    config: &dyn ConfigPort,
    section: &str,
    code: &str,
) -> Result<InstrumentSpec, CotError> {
    let invalid = |key: &str, reason: String| CotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    };
    let missing = |key: &str| CotError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    };

    let name = config
        .get_string(section, "name")
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| missing("name"))?;
    let category: Category = config
        .get_string(section, "category")
        .ok_or_else(|| missing("category"))?
        .parse()
        .map_err(|e: UnknownCategory| invalid("category", e.to_string()))?;
    if config.get_string(section, "contract_size").is_none() {
        return Err(missing("contract_size"));
    }
    let contract_size = config.get_double(section, "contract_size", f64::NAN);
    if contract_size.is_nan() {
        return Err(invalid("contract_size", "contract_size must be a number".into()));
    }

    Ok(InstrumentSpec::new(code, name.trim(), contract_size, category))
}

pub fn validate_instrument_table(table: &InstrumentTable) -> Result<(), CotError> {
    if table.is_empty() {
        return Err(CotError::ConfigInvalid {
            section: "cot".into(),
            key: "targets".into(),
            reason: "no instruments configured".into(),
        });
    }
    for spec in table.iter() {
        let section = format!("{INSTRUMENT_SECTION_PREFIX}{}", spec.code);
        if !is_valid_code(&spec.code) {
            return Err(CotError::ConfigInvalid {
                section,
                key: "code".into(),
                reason: "code must be 6 alphanumeric characters".into(),
            });
        }
        if !(spec.contract_size.is_finite() && spec.contract_size > 0.0) {
            return Err(CotError::ConfigInvalid {
                section,
                key: "contract_size".into(),
                reason: "contract_size must be positive".into(),
            });
        }
    }
    Ok(())
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn history_backend(config: &dyn ConfigPort) -> Result<HistoryBackend, CotError> {
    match config
        .get_string("history", "backend")
        .map(|b| b.trim().to_lowercase())
        .as_deref()
    {
        None | Some("json") => Ok(HistoryBackend::Json),
        Some("sqlite") => {
            if config.get_string("sqlite", "path").is_none() {
                return Err(CotError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                });
            }
            Ok(HistoryBackend::Sqlite)
        }
        Some("memory") => Ok(HistoryBackend::Memory),
        Some(other) => Err(CotError::ConfigInvalid {
            section: "history".into(),
            key: "backend".into(),
            reason: format!("unknown backend '{other}' (expected json, sqlite or memory)"),
        }),
    }
}
