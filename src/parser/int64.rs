//! Lossless decimal rendering of little-endian signed 64-bit integers.
//!
//! The value is split into four 16-bit limbs and re-expressed in base 10000
//! with fixed per-limb weights (65536^k written in base 10000):
//!
//! ```text
//! 65536^1 =                 6|5536
//! 65536^2 =            42|9496|7296
//! 65536^3 = 281|4749|7671|0656
//! ```
//!
//! Every intermediate fits in a `u32`, so no wider integer or float is involved.

use std::fmt::Write;

pub(crate) fn to_decimal(bytes: [u8; 8]) -> String {
    let mut d0 = u32::from(u16::from_le_bytes([bytes[0], bytes[1]]));
    let mut d1 = u32::from(u16::from_le_bytes([bytes[2], bytes[3]]));
    let mut d2 = u32::from(u16::from_le_bytes([bytes[4], bytes[5]]));
    let mut d3 = u32::from(u16::from_le_bytes([bytes[6], bytes[7]]));

    let negative = d3 & 0x8000 != 0;
    if negative {
        d0 ^= 0xffff;
        d1 ^= 0xffff;
        d2 ^= 0xffff;
        d3 ^= 0xffff;
    }

    // Two's complement: the +1 rides along in the lowest group.
    let g0 = 656 * d3 + 7296 * d2 + 5536 * d1 + d0 + u32::from(negative);
    let mut q = g0 / 10000;
    let g0 = g0 % 10000;

    let g1 = q + 7671 * d3 + 9496 * d2 + 6 * d1;
    q = g1 / 10000;
    let g1 = g1 % 10000;

    let g2 = q + 4749 * d3 + 42 * d2;
    q = g2 / 10000;
    let g2 = g2 % 10000;

    let g3 = q + 281 * d3;
    let g4 = g3 / 10000;
    let g3 = g3 % 10000;

    let mut digits = String::with_capacity(21);
    // Writing into a String cannot fail.
    let _ = write!(digits, "{}{:04}{:04}{:04}{:04}", g4, g3, g2, g1, g0);
    let trimmed = digits.trim_start_matches('0');

    let mut out = String::with_capacity(trimmed.len() + 1);
    if negative {
        out.push('-');
    }
    if trimmed.is_empty() {
        out.push('0');
    } else {
        out.push_str(trimmed);
    }
    out
}

/// The value rebuilt the native way: `high * 2^32 + low` in `f64`.
#[inline]
pub(crate) fn approximate(bytes: [u8; 8]) -> f64 {
    let low = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let high = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

/// Integral numeral for an `f64` that holds a whole number.
#[inline]
pub(crate) fn format_approximate(value: f64) -> String {
    format!("{}", value)
}
