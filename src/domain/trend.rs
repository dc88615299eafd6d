//! Positioning trends across stored reports.

use crate::domain::report::Report;
use crate::domain::snapshot::{Signal, is_flip};

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub net_position: i64,
    pub net_percent: f64,
    pub delta: f64,
    pub signal: Signal,
    pub is_flip: bool,
}

/// Series for one instrument, in calendar order.
///
/// Reports that do not contain `code` are skipped.
pub fn instrument_trend(reports: &[Report], code: &str) -> Vec<TrendPoint> {
    let mut dated: Vec<_> = reports
        .iter()
        .filter_map(|report| {
            report.get(code).map(|s| {
                let point = TrendPoint {
                    date: report.date.clone(),
                    net_position: s.net_position,
                    net_percent: s.net_percent,
                    delta: s.delta,
                    signal: s.signal,
                    is_flip: s.is_flip,
                };
                (report.as_of(), point)
            })
        })
        .collect();
    // calendar order where the date parses; unparsed dates sort first, by text
    dated.sort_by(|(a_day, a), (b_day, b)| a_day.cmp(b_day).then_with(|| a.date.cmp(&b.date)));
    dated.into_iter().map(|(_, point)| point).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotChange {
    pub code: String,
    pub display_name: String,
    pub net_percent: f64,
    /// `None` when the instrument is absent from the previous report.
    pub net_percent_change: Option<f64>,
    pub previous_signal: Option<Signal>,
    pub signal: Signal,
    /// Net position sign crossed zero between the two stored reports.
    pub crossed_zero: bool,
}

impl SnapshotChange {
    pub fn signal_changed(&self) -> bool {
        self.previous_signal.is_some_and(|prev| prev != self.signal)
    }
}

/// Compare every instrument of `current` against `previous`, in `current` order.
pub fn compare_reports(current: &Report, previous: &Report) -> Vec<SnapshotChange> {
    current
        .instruments
        .iter()
        .map(|snap| {
            let prev = previous.get(&snap.code);
            SnapshotChange {
                code: snap.code.clone(),
                display_name: snap.display_name.clone(),
                net_percent: snap.net_percent,
                net_percent_change: prev.map(|p| snap.net_percent - p.net_percent),
                previous_signal: prev.map(|p| p.signal),
                signal: snap.signal,
                crossed_zero: prev.is_some_and(|p| {
                    is_flip(snap.net_position as f64, p.net_position as f64)
                }),
            }
        })
        .collect()
}
