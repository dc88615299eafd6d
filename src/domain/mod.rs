//! Core domain types and logic: the COT parser and signal engine.

pub mod number;
pub mod instrument;
pub mod column;
pub mod locator;
pub mod snapshot;
pub mod report;
pub mod parser;
pub mod trend;
pub mod config_validation;
pub mod error;
