//! HTML rendering of fitness BLAST hits
//!
//! Both views are pure functions of the hits, the thresholds and the link
//! builder. Writing the markup into a page is left to the loader.

mod links;
pub mod short;
pub mod table;

pub use links::Links;

use crate::config::Thresholds;
use crate::hits::Hit;

/// Which widget to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One or two summary lines
    Short,
    /// Table of all well-covered hits
    Table,
}

impl View {
    pub fn render(self, hits: &[Hit], sequence: &str, links: &Links, thresholds: &Thresholds) -> String {
        match self {
            View::Short => short::render(hits, sequence, links, thresholds),
            View::Table => table::render(hits, links, thresholds),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Short => write!(f, "short"),
            View::Table => write!(f, "table"),
        }
    }
}

/// Enough decimals to print any f64 exactly
const EXACT_DIGITS: usize = 1074;

/// Format with a fixed number of decimals. The exact binary value is
/// rounded to nearest; only exact halves go away from zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if !is_exact_half(value, digits) {
        return format!("{:.*}", digits, value);
    }

    // An exact half scales to a representable x.5, so round() is exact here
    let scaled = (value.abs() * 10f64.powi(digits as i32)).round();
    let mut units = format!("{:.0}", scaled);
    if units.len() <= digits {
        units = format!("{}{}", "0".repeat(digits + 1 - units.len()), units);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    if digits == 0 {
        format!("{}{}", sign, units)
    } else {
        let (whole, fraction) = units.split_at(units.len() - digits);
        format!("{}{}.{}", sign, whole, fraction)
    }
}

/// True if `value` has exactly `digits + 1` decimals and the last one is 5
fn is_exact_half(value: f64, digits: usize) -> bool {
    let exact = format!("{:.*}", EXACT_DIGITS, value);
    let fraction = exact
        .split_once('.')
        .map(|(_, f)| f.trim_end_matches('0'))
        .unwrap_or_default();
    fraction.len() == digits + 1 && fraction.ends_with('5')
}
