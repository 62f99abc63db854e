// Parsing and number helpers shared by the loader, the aggregator and the
// row renderers.
//
// Source files come from ward offices and spreadsheets, so numeric cells
// are parsed leniently and anything unusable becomes `None`.
use num_format::{Locale, ToFormattedString};
use std::collections::BTreeSet;

/// Highest ward number accepted in a ward list.
pub const MAX_WARD: u32 = 99;

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters other than an
///   exponent marker, so `1.2E+03` parses while `NaN` and `inf` do not.
/// - Strips thousands separators like `","` before parsing.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
    {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Ward numbers are small positive integers; `"03"` and `" 3 "` are both ward 3.
pub fn parse_ward_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok().filter(|w| *w > 0)
}

/// Measure value with the "malformed is zero" rule applied.
pub fn measure_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// `part / total * 100`, defined as 0 when the total is 0.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total.abs() < f64::EPSILON {
        return 0.0;
    }
    let pct = part / total * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `12,345.67`.
    if !n.is_finite() {
        return "0".to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    // Beyond u128 the digits are printed without separators.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    // Sign is decided on the rounded text so `-0.001` prints as `0.00`.
    let rounds_to_zero = s.chars().all(|c| c == '0' || c == '.');
    if n < 0.0 && !rounds_to_zero {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Parse a ward list such as `"1,2,5-9"` into ward numbers.
///
/// Ranges are inclusive. Wards above [`MAX_WARD`] are rejected. Duplicates
/// are dropped while keeping first-seen order.
pub fn parse_ward_list(s: &str) -> Option<Vec<u32>> {
    let parse = |p: &str| parse_ward_safe(Some(p)).filter(|w| *w <= MAX_WARD);
    let mut seen: BTreeSet<u32> = BTreeSet::new();
    let mut wards: Vec<u32> = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (parse(lo)?, parse(hi)?),
            None => {
                let w = parse(part)?;
                (w, w)
            }
        };
        if lo > hi {
            return None;
        }
        for w in lo..=hi {
            if seen.insert(w) {
                wards.push(w);
            }
        }
    }
    if wards.is_empty() {
        None
    } else {
        Some(wards)
    }
}
