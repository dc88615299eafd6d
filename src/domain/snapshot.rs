//! Metric engine: per-instrument positioning snapshot.
//!
//! The prior week is reconstructed from the current values minus the published
//! weekly changes, so a single export is enough to compute week-over-week
//! movement. All intermediate math is unrounded; rounding happens only when the
//! snapshot is built.

use crate::domain::column::ColumnStrategy;
use crate::domain::instrument::InstrumentSpec;
use crate::domain::number::{field_number, finite_or_zero, round_to};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Neutral,
    StrongLong,
    StrongShort,
    Divergence,
    CotFlip,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Neutral => "NEUTRAL",
            Signal::StrongLong => "STRONG_LONG",
            Signal::StrongShort => "STRONG_SHORT",
            Signal::Divergence => "DIVERGENCE",
            Signal::CotFlip => "COT_FLIP",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw figures extracted from one record, plus the reconstructed prior week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFigures {
    pub open_interest: f64,
    pub long: f64,
    pub short: f64,
    pub change_open_interest: f64,
    pub change_long: f64,
    pub change_short: f64,
}

impl PositionFigures {
    pub fn extract(fields: &[String], strategy: &ColumnStrategy) -> Self {
        Self {
            open_interest: field_number(fields, strategy.open_interest),
            long: field_number(fields, strategy.long),
            short: field_number(fields, strategy.short),
            change_open_interest: field_number(fields, strategy.change_open_interest),
            change_long: field_number(fields, strategy.change_long),
            change_short: field_number(fields, strategy.change_short),
        }
    }

    pub fn net(&self) -> f64 {
        self.long - self.short
    }

    pub fn prior_open_interest(&self) -> f64 {
        self.open_interest - self.change_open_interest
    }

    pub fn prior_long(&self) -> f64 {
        self.long - self.change_long
    }

    pub fn prior_short(&self) -> f64 {
        self.short - self.change_short
    }

    pub fn prior_net(&self) -> f64 {
        self.prior_long() - self.prior_short()
    }

    pub fn net_percent(&self) -> f64 {
        percent_of(self.net(), self.open_interest)
    }

    pub fn prior_net_percent(&self) -> f64 {
        percent_of(self.prior_net(), self.prior_open_interest())
    }
}

/// Zero open interest, or a quotient that overflows, yields `0.0`.
fn percent_of(net: f64, open_interest: f64) -> f64 {
    if open_interest != 0.0 {
        finite_or_zero(net / open_interest * 100.0)
    } else {
        0.0
    }
}

/// Net position sign crossed zero week over week.
pub fn is_flip(net: f64, prior_net: f64) -> bool {
    (net > 0.0 && prior_net < 0.0) || (net < 0.0 && prior_net > 0.0)
}

/// Later rules override earlier ones; a flip always wins.
pub fn classify_signal(net: f64, delta: f64, flip: bool) -> Signal {
    let mut signal = Signal::Neutral;
    if net > 0.0 && delta > 0.0 {
        signal = Signal::StrongLong;
    }
    if net < 0.0 && delta < 0.0 {
        signal = Signal::StrongShort;
    }
    if (net > 0.0 && delta < 0.0) || (net < 0.0 && delta > 0.0) {
        signal = Signal::Divergence;
    }
    if flip {
        signal = Signal::CotFlip;
    }
    signal
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSnapshot {
    pub code: String,
    pub display_name: String,
    pub net_position: i64,
    pub net_value: f64,
    pub net_percent: f64,
    pub prior_net_percent: f64,
    pub delta: f64,
    pub signal: Signal,
    pub is_flip: bool,
}

impl InstrumentSnapshot {
    pub fn from_figures(spec: &InstrumentSpec, figures: &PositionFigures) -> Self {
        let net = figures.net();
        let prior_net = figures.prior_net();
        let net_percent = figures.net_percent();
        let prior_net_percent = figures.prior_net_percent();
        let delta = finite_or_zero(net_percent - prior_net_percent);
        let flip = is_flip(net, prior_net);

        let net_position = net.round() as i64;
        Self {
            code: spec.code.clone(),
            display_name: spec.display_name.clone(),
            net_position,
            net_value: finite_or_zero(net_position as f64 * spec.contract_size),
            net_percent: round_to(net_percent, 1),
            prior_net_percent: round_to(prior_net_percent, 1),
            delta: round_to(delta, 1),
            signal: classify_signal(net, delta, flip),
            is_flip: flip,
        }
    }
}

pub fn compute_snapshot(
    spec: &InstrumentSpec,
    fields: &[String],
    strategy: &ColumnStrategy,
) -> InstrumentSnapshot {
    let figures = PositionFigures::extract(fields, strategy);
    InstrumentSnapshot::from_figures(spec, &figures)
}
