//! Lenient numeric field parsing for COT export tokens.

/// Parse a raw field into a number.
///
/// Whitespace and thousands separators are removed before conversion. Blank,
/// missing and non-numeric tokens yield `0.0`; government exports routinely
/// carry blank trailing fields, so a zero here can mean either "absent" or
/// "truly zero".
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Parse the field at `index`, treating a missing field as blank.
pub fn field_number(fields: &[String], index: usize) -> f64 {
    fields.get(index).map(|f| parse_number(f)).unwrap_or(0.0)
}

/// Map NaN and infinities to `0.0`.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Round half away from zero to `decimals` places.
///
/// Non-finite input yields `0.0`. Values too large to scale are returned
/// unchanged; they carry no fractional digits anyway.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    let rounded = if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    };
    // avoid "-0.0" leaking into output
    if rounded == 0.0 { 0.0 } else { rounded }
}
