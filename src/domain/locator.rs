//! Record locator: finds target-instrument lines in raw COT exports.
//!
//! Most lines of an export belong to instruments outside the configured
//! table; those are skipped without error. Matched lines whose open interest
//! parses to zero are placeholder or footer rows and are skipped too.

use crate::domain::column::DATE_FIELD;
use crate::domain::instrument::{InstrumentSpec, InstrumentTable};
use crate::domain::number::field_number;

/// A matched line with its instrument and raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedRecord<'t> {
    pub spec: &'t InstrumentSpec,
    pub fields: Vec<String>,
}

impl LocatedRecord<'_> {
    /// The as-of date printed in this record.
    pub fn date(&self) -> &str {
        self.fields.get(DATE_FIELD).map(|f| f.trim()).unwrap_or("")
    }
}

/// Strip quote characters and split on commas.
pub fn split_fields(line: &str) -> Vec<String> {
    line.replace('"', "").split(',').map(str::to_string).collect()
}

/// Lazy iterator over accepted records.
pub struct RecordLocator<'t, I> {
    lines: I,
    table: &'t InstrumentTable,
}

impl<'t, I> RecordLocator<'t, I> {
    pub fn new(lines: I, table: &'t InstrumentTable) -> Self {
        Self { lines, table }
    }
}

/// Match one line against the table, rejecting zero open interest rows.
pub fn match_line<'t>(line: &str, table: &'t InstrumentTable) -> Option<LocatedRecord<'t>> {
    let fields = split_fields(line);
    let spec = fields.iter().find_map(|f| table.get(f.trim()))?;

    if field_number(&fields, spec.strategy().open_interest) == 0.0 {
        tracing::debug!(code = %spec.code, "skipping line with zero open interest");
        return None;
    }

    Some(LocatedRecord { spec, fields })
}

impl<'t, 'l, I> Iterator for RecordLocator<'t, I>
where
    I: Iterator<Item = &'l str>,
{
    type Item = LocatedRecord<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                continue;
            }
            match match_line(line, table) {
                Some(record) => return Some(record),
                None => tracing::trace!("no target instrument on line"),
            }
        }
        None
    }
}

pub fn locate_records<'t, 'l, I>(lines: I, table: &'t InstrumentTable) -> RecordLocator<'t, I::IntoIter>
where
    I: IntoIterator<Item = &'l str>,
{
    RecordLocator::new(lines.into_iter(), table)
}

/// Locate records across several source files, in file then line order.
pub fn locate_in_sources<'t, 'l>(
    sources: &'l [&'l str],
    table: &'t InstrumentTable,
) -> RecordLocator<'t, impl Iterator<Item = &'l str>> {
    RecordLocator::new(sources.iter().flat_map(|s| s.lines()), table)
}
