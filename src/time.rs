//! Conversion between unix time values and their decimal representation.
//!
//! Time values are signed so that clock-offset-adjusted and skew-test timestamps can be
//! represented.

use crate::error::*;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of bytes `t` occupies in decimal form, including a leading `-` for negative values.
pub fn number_of_digits(t: i64) -> usize {
    let mut n = t.unsigned_abs();
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    if t < 0 {
        digits + 1
    } else {
        digits
    }
}

/// Write `t` in decimal to the front of `buf`, returning the number of bytes written.
pub fn format_time(t: i64, buf: &mut [u8]) -> Result<usize> {
    let len = number_of_digits(t);
    if buf.len() < len {
        return Err(Error::Other(format!(
            "time value {} needs {} bytes, buffer has {}",
            t,
            len,
            buf.len()
        )));
    }
    let mut n = t.unsigned_abs();
    let mut i = len;
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    if t < 0 {
        buf[0] = b'-';
    }
    Ok(len)
}

/// Parse a decimal time value.
///
/// Only the canonical form is accepted: an optional `-` followed by digits without leading
/// zeros. Values outside the range of `i64` are rejected rather than wrapped.
pub fn parse_time(value: &[u8]) -> Result<i64> {
    let invalid = || Error::TimeValue(String::from_utf8_lossy(value).into_owned());
    let (negative, digits) = match value.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some(_) => (false, value),
        None => return Err(invalid()),
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    // accumulate towards the sign so that i64::MIN is representable
    let mut t: i64 = 0;
    for &c in digits {
        if !c.is_ascii_digit() {
            return Err(invalid());
        }
        let d = i64::from(c - b'0');
        t = t
            .checked_mul(10)
            .and_then(|t| if negative { t.checked_sub(d) } else { t.checked_add(d) })
            .ok_or_else(invalid)?;
    }

    // reject anything that would not format back to the same bytes (leading zeros, "-0")
    if number_of_digits(t) != value.len() {
        return Err(invalid());
    }
    Ok(t)
}

/// The current unix time in seconds, adjusted by `offset`.
pub fn now(offset: i64) -> Result<i64> {
    let secs = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    };
    secs.checked_add(offset)
        .ok_or_else(|| Error::Overflow(format!("current time {} plus offset {}", secs, offset)))
}
