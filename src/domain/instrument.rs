//! Instrument specifications and the static code table.
//!
//! Codes are the exchange-assigned identifiers printed in every COT export
//! line. The table is built once at startup and read-only afterwards.

use crate::domain::column::{ColumnStrategy, resolve_strategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Forex,
    Indices,
    Crypto,
    Bonds,
    Commodity,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Forex,
        Category::Indices,
        Category::Crypto,
        Category::Bonds,
        Category::Commodity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Forex => "forex",
            Category::Indices => "indices",
            Category::Crypto => "crypto",
            Category::Bonds => "bonds",
            Category::Commodity => "commodity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forex" | "fx" => Ok(Category::Forex),
            "indices" | "index" => Ok(Category::Indices),
            "crypto" => Ok(Category::Crypto),
            "bonds" | "bond" | "rates" => Ok(Category::Bonds),
            "commodity" | "commodities" => Ok(Category::Commodity),
            _ => Err(UnknownCategory(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSpec {
    pub code: String,
    pub display_name: String,
    pub contract_size: f64,
    pub category: Category,
}

impl InstrumentSpec {
    pub fn new(code: &str, display_name: &str, contract_size: f64, category: Category) -> Self {
        Self {
            code: code.to_string(),
            display_name: display_name.to_string(),
            contract_size,
            category,
        }
    }

    pub fn strategy(&self) -> &'static ColumnStrategy {
        resolve_strategy(self.category)
    }
}

/// Built-in instruments: (code, display name, contract size, category).
pub const DEFAULT_INSTRUMENTS: &[(&str, &str, f64, Category)] = &[
    ("098662", "USD Index", 1_000.0, Category::Forex),
    ("099741", "Euro FX", 125_000.0, Category::Forex),
    ("096742", "British Pound", 62_500.0, Category::Forex),
    ("097741", "Japanese Yen", 12_500_000.0, Category::Forex),
    ("092741", "Swiss Franc", 125_000.0, Category::Forex),
    ("090741", "Canadian Dollar", 100_000.0, Category::Forex),
    ("232741", "Australian Dollar", 100_000.0, Category::Forex),
    ("112741", "New Zealand Dollar", 100_000.0, Category::Forex),
    ("13874A", "E-mini S&P 500", 50.0, Category::Indices),
    ("209742", "Nasdaq-100 Mini", 20.0, Category::Indices),
    ("124603", "Dow Jones Mini", 5.0, Category::Indices),
    ("239742", "Russell 2000 Mini", 50.0, Category::Indices),
    ("133741", "Bitcoin", 5.0, Category::Crypto),
    ("146021", "Ether", 50.0, Category::Crypto),
    ("043602", "10-Year T-Note", 100_000.0, Category::Bonds),
    ("020601", "30-Year T-Bond", 100_000.0, Category::Bonds),
    ("088691", "Gold", 100.0, Category::Commodity),
    ("084691", "Silver", 5_000.0, Category::Commodity),
    ("085692", "Copper", 25_000.0, Category::Commodity),
    ("067651", "WTI Crude Oil", 1_000.0, Category::Commodity),
    ("023651", "Natural Gas", 10_000.0, Category::Commodity),
    ("001602", "Wheat", 5_000.0, Category::Commodity),
    ("002602", "Corn", 5_000.0, Category::Commodity),
    ("005602", "Soybeans", 5_000.0, Category::Commodity),
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("duplicate instrument code: {0}")]
pub struct DuplicateCode(pub String);

/// Read-only lookup of instrument specs by code.
#[derive(Debug, Clone, Default)]
pub struct InstrumentTable {
    specs: BTreeMap<String, InstrumentSpec>,
}

impl InstrumentTable {
    pub fn from_specs(specs: Vec<InstrumentSpec>) -> Result<Self, DuplicateCode> {
        let mut map = BTreeMap::new();
        for spec in specs {
            if map.contains_key(&spec.code) {
                return Err(DuplicateCode(spec.code));
            }
            map.insert(spec.code.clone(), spec);
        }
        Ok(Self { specs: map })
    }

    pub fn builtin() -> Self {
        let specs = DEFAULT_INSTRUMENTS
            .iter()
            .map(|(code, name, size, category)| InstrumentSpec::new(code, name, *size, *category))
            .collect();
        // the built-in list is checked for uniqueness in tests
        Self::from_specs(specs).unwrap_or_default()
    }

    /// Insert or replace an entry by code.
    pub fn upsert(&mut self, spec: InstrumentSpec) {
        self.specs.insert(spec.code.clone(), spec);
    }

    /// Keep only the given codes. Returns the targets that were not in the table.
    pub fn retain_targets(&mut self, targets: &[String]) -> Vec<String> {
        let wanted: HashSet<&str> = targets.iter().map(String::as_str).collect();
        let missing = targets
            .iter()
            .filter(|t| !self.specs.contains_key(t.as_str()))
            .cloned()
            .collect();
        self.specs.retain(|code, _| wanted.contains(code.as_str()));
        missing
    }

    pub fn get(&self, code: &str) -> Option<&InstrumentSpec> {
        self.specs.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.specs.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentSpec> {
        self.specs.values()
    }
}
