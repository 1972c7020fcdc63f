//! Raw-text parsers for typed settings.
//!
//! Settings are stored as text and parsed on every read.  The parsers here
//! are pure and total: for every input they return either a value or a
//! [`ParseError`], and never panic.
//!
//! # Quantity grammar
//!
//! Time and size strings share one grammar:
//!
//! ```text
//! quantity := ws* digits ( "." digits )? ws* unit? ws*
//! ```
//!
//! The unit is matched case-insensitively against a per-parser table of
//! multipliers.  A decimal coefficient is multiplied exactly (integer
//! arithmetic) and the result truncated toward zero, so `"10.3 MB"` yields
//! `10_800_332` bytes.

use std::num::IntErrorKind;

use thiserror::Error;

pub mod size;
pub mod time;

pub use size::parse_size_string;
pub use time::parse_time_string;

/// Error produced when raw setting text cannot be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or contained only whitespace.
    #[error("value is empty")]
    Empty,

    /// The numeric part is missing or malformed.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// The unit suffix is not recognised.
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),

    /// The value does not fit in 64 bits.
    #[error("value out of range: {0:?}")]
    Overflow(String),
}

/// Largest number of fractional digits taken into account.  Further digits
/// cannot change the truncated result for any supported multiplier.
const MAX_FRACTION_DIGITS: usize = 18;

/// Splits `text` into a number and a unit and scales the number by the
/// multiplier `unit_multiplier` returns for the unit.
pub(crate) fn parse_quantity(
    text: &str,
    unit_multiplier: impl Fn(&str) -> Option<u64>,
) -> Result<u64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let number_end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, rest) = trimmed.split_at(number_end);
    let unit = rest.trim_start().to_ascii_lowercase();

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (number, None),
    };
    let digits_ok = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits_ok(whole) || fraction.is_some_and(|f| !digits_ok(f)) {
        return Err(ParseError::InvalidNumber(text.to_string()));
    }

    let multiplier = unit_multiplier(&unit).ok_or(ParseError::UnknownUnit(unit))?;
    let overflow = || ParseError::Overflow(text.to_string());

    let whole: u64 = whole.parse().map_err(|_| overflow())?;
    let mut total = whole.checked_mul(multiplier).ok_or_else(overflow)?;

    if let Some(fraction) = fraction {
        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        // Both fit: numerator < 10^18, multiplier < 2^31.
        let numerator: u128 = fraction.parse().map_err(|_| overflow())?;
        let denominator = 10u128.pow(fraction.len() as u32);
        let scaled = numerator * u128::from(multiplier) / denominator;
        let scaled = u64::try_from(scaled).map_err(|_| overflow())?;
        total = total.checked_add(scaled).ok_or_else(overflow)?;
    }

    Ok(total)
}

/// Parses a boolean setting: `"true"` and `"1"` are true, everything else is
/// false.
pub fn parse_bool_string(text: &str) -> bool {
    text == "true" || text == "1"
}

/// Parses a signed integer setting.  Surrounding whitespace is ignored.
///
/// # Errors
///
/// [`ParseError::Empty`] for blank input, [`ParseError::Overflow`] when the
/// value does not fit in an `i64`, and [`ParseError::InvalidNumber`] otherwise.
pub fn parse_int_string(text: &str) -> Result<i64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    trimmed.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            ParseError::Overflow(text.to_string())
        }
        _ => ParseError::InvalidNumber(text.to_string()),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
