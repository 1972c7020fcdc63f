//! Byte size strings: `"15mb"`, `"550Kb"`, `"10.3 MB"`, `"2GiB"`.
//!
//! Multipliers are binary: `kb` is 1024 bytes, `mb` is 1024², `gb` is 1024³.
//! The IEC spelling with an `i` infix (`kib`, `mib`, `gib`) is accepted and
//! means the same thing, as does the bare letter (`k`, `m`, `g`).

use super::{parse_quantity, ParseError};

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

fn size_unit(unit: &str) -> Option<u64> {
    match unit {
        "" | "b" => Some(1),
        "k" | "kb" | "kib" => Some(KIB),
        "m" | "mb" | "mib" => Some(MIB),
        "g" | "gb" | "gib" => Some(GIB),
        _ => None,
    }
}

/// Parses a byte size string into bytes.
///
/// # Errors
///
/// Returns a [`ParseError`] for empty input, a missing or malformed number,
/// an unknown unit, or a result that does not fit in a `u64`.
pub fn parse_size_string(text: &str) -> Result<u64, ParseError> {
    parse_quantity(text, size_unit)
}
