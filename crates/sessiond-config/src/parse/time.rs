//! Time interval strings: `"60"`, `"5m"`, `"2h"`, `"1.5d"`.

use super::{parse_quantity, ParseError};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

fn time_unit(unit: &str) -> Option<u64> {
    match unit {
        "" | "s" => Some(1),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        "d" => Some(DAY),
        _ => None,
    }
}

/// Parses a time interval string into whole seconds.
///
/// A bare number is seconds.  The suffixes `s`, `m`, `h`, and `d` (any case)
/// scale by 1, 60, 3600, and 86400.  Decimal coefficients are accepted and
/// the result is truncated to whole seconds.
///
/// # Errors
///
/// Returns a [`ParseError`] for empty input, a missing or malformed number,
/// an unknown suffix, or a result that does not fit in a `u64`.
pub fn parse_time_string(text: &str) -> Result<u64, ParseError> {
    parse_quantity(text, time_unit)
}
