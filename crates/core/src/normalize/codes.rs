//! Parsing and normalization of StatFin dimension codes.

use serde::{Deserialize, Serialize};

use super::error::NormalizeError;

/// Region code for the whole country.
pub const WHOLE_COUNTRY: &str = "SSS";

/// A point on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Year.
    pub year: i32,
    /// Quarter for quarterly codes.
    pub quarter: Option<i32>,
    /// Month for monthly codes.
    pub month: Option<i32>,
}

impl TimePeriod {
    const fn year_only(year: i32) -> Self {
        Self {
            year,
            quarter: None,
            month: None,
        }
    }
}

/// Parses a StatFin time code.
///
/// Accepted forms: `2023`, `2023Q1` (quarters 1-4), `2023M01` or `2023M1`, and
/// `2023-01`. Anything else containing four consecutive digits yields those digits as
/// the year alone.
pub fn parse_time_code(code: &str) -> Result<TimePeriod, NormalizeError> {
    if let Some(period) = parse_exact(code) {
        return Ok(period);
    }

    let bytes = code.as_bytes();
    let year = bytes
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|start| code.get(start..start + 4))
        .and_then(|digits| digits.parse().ok());

    match year {
        Some(year) => {
            tracing::warn!(time_code = %code, year, "time code only partially parsed, using year");
            Ok(TimePeriod::year_only(year))
        }
        None => Err(NormalizeError::UnrecognizedTimeCode(code.to_string())),
    }
}

fn parse_exact(code: &str) -> Option<TimePeriod> {
    let year_part = code.get(..4)?;
    if !is_digits(year_part) {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let rest = &code[4..];

    if rest.is_empty() {
        return Some(TimePeriod::year_only(year));
    }
    if let Some(q) = rest.strip_prefix('Q') {
        return match q {
            "1" | "2" | "3" | "4" => Some(TimePeriod {
                year,
                quarter: q.parse().ok(),
                month: None,
            }),
            _ => None,
        };
    }
    let month = rest
        .strip_prefix('M')
        .filter(|m| (1..=2).contains(&m.len()))
        .or_else(|| rest.strip_prefix('-').filter(|m| m.len() == 2))?;
    if !is_digits(month) {
        return None;
    }
    Some(TimePeriod {
        year,
        quarter: None,
        month: month.parse().ok(),
    })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Normalizes a region code.
///
/// Whole-country spellings become `SSS`. A leading `MK` (maakunta) is dropped when
/// digits follow it.
#[must_use]
pub fn normalize_region_code(code: &str) -> String {
    let trimmed = code.trim();
    let upper = trimmed.to_uppercase();
    if matches!(upper.as_str(), "SSS" | "KOKO MAA" | "WHOLE COUNTRY") {
        return WHOLE_COUNTRY.to_string();
    }

    match trimmed.get(2..) {
        Some(rest) if upper.starts_with("MK") && !rest.is_empty() => rest.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Normalizes an industry code to bare TOL 2008 form: trimmed, uppercase, without
/// a `TOL_` or `TOL2008_` prefix.
#[must_use]
pub fn normalize_industry_code(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    upper
        .strip_prefix("TOL_")
        .or_else(|| upper.strip_prefix("TOL2008_"))
        .map_or_else(|| upper.clone(), String::from)
}
