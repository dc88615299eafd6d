//! Fixed column layouts of the two COT report formats.
//!
//! The exports are headerless, so field positions are known per format rather
//! than discovered from a header row. Financial instruments come from the
//! "Traders in Financial Futures" report and commodities from the
//! "Disaggregated" report; both place open interest, leveraged-fund long/short
//! and their weekly changes at different offsets.

use crate::domain::instrument::Category;

/// Index of the as-of date field in every record.
pub const DATE_FIELD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    FinancialFutures,
    DisaggregatedCommodity,
}

/// 0-based field positions inside one parsed data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStrategy {
    pub layout: ReportLayout,
    pub open_interest: usize,
    pub long: usize,
    pub short: usize,
    pub change_open_interest: usize,
    pub change_long: usize,
    pub change_short: usize,
}

impl ColumnStrategy {
    /// Highest field index this layout reads.
    pub fn max_index(&self) -> usize {
        [
            self.open_interest,
            self.long,
            self.short,
            self.change_open_interest,
            self.change_long,
            self.change_short,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

pub const FINANCIAL_FUTURES: ColumnStrategy = ColumnStrategy {
    layout: ReportLayout::FinancialFutures,
    open_interest: 7,
    long: 14,
    short: 15,
    change_open_interest: 24,
    change_long: 31,
    change_short: 32,
};

pub const DISAGGREGATED_COMMODITY: ColumnStrategy = ColumnStrategy {
    layout: ReportLayout::DisaggregatedCommodity,
    open_interest: 7,
    long: 12,
    short: 13,
    change_open_interest: 24,
    change_long: 29,
    change_short: 30,
};

pub fn resolve_strategy(category: Category) -> &'static ColumnStrategy {
    match category {
        Category::Forex | Category::Indices | Category::Crypto | Category::Bonds => {
            &FINANCIAL_FUTURES
        }
        Category::Commodity => &DISAGGREGATED_COMMODITY,
    }
}
