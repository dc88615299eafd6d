#![allow(dead_code)]

use cotwatch::domain::instrument::{Category, InstrumentSpec, InstrumentTable};
use std::io::Write;

/// Figures in layout order: open interest, long, short, change OI, change long, change short.
pub type Figures = [i64; 6];

const LINE_WIDTH: usize = 40;

fn line_with(date: &str, code: &str, v: Figures, columns: [usize; 6]) -> String {
    let mut fields = vec![String::new(); LINE_WIDTH];
    fields[0] = "\"MARKET NAME - EXCHANGE\"".into();
    fields[1] = "240109".into();
    fields[2] = date.into();
    fields[3] = code.into();
    for (value, col) in v.iter().zip(columns) {
        fields[col] = value.to_string();
    }
    fields.join(",")
}

/// A Financial Futures row (leveraged funds at 14/15, changes at 24/31/32).
pub fn tff_line(date: &str, code: &str, v: Figures) -> String {
    line_with(date, code, v, [7, 14, 15, 24, 31, 32])
}

/// A Disaggregated row (managed money at 12/13, changes at 24/29/30).
pub fn disagg_line(date: &str, code: &str, v: Figures) -> String {
    line_with(date, code, v, [7, 12, 13, 24, 29, 30])
}

pub fn file_of(lines: &[String]) -> String {
    let mut out = String::from("\"Market_and_Exchange_Names\",\"As_of_Date_In_Form_YYMMDD\",\"Report_Date_as_YYYY-MM-DD\",\"CFTC_Contract_Market_Code\"\n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn sample_table() -> InstrumentTable {
    InstrumentTable::from_specs(vec![
        InstrumentSpec::new("098662", "USD Index", 1_000.0, Category::Forex),
        InstrumentSpec::new("099741", "Euro FX", 125_000.0, Category::Forex),
        InstrumentSpec::new("13874A", "E-mini S&P 500", 50.0, Category::Indices),
        InstrumentSpec::new("088691", "Gold", 100.0, Category::Commodity),
        InstrumentSpec::new("067651", "WTI Crude Oil", 1_000.0, Category::Commodity),
    ])
    .unwrap()
}

/// USD Index: net 8000 on 50000 OI, prior net 7200 on 49000.
pub fn usd_week(date: &str) -> String {
    tff_line(date, "098662", [50000, 20000, 12000, 1000, 500, -300])
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
