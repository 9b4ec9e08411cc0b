//! Codec for the `dateTime.iso8601` variant.
//!
//! The wire form is `yyyymmddThh:mm:ss`: second precision, no timezone.
//! The year may be wider than four digits and may carry a leading minus;
//! month, day, and the time fields are always two digits. The year is
//! formatted by hand because a strftime `%Y` prefixes wide years with `+`,
//! which would not re-parse. Sub-second precision is truncated on encode.
//! Decoding validates structurally (sign, digit, and colon positions)
//! before any arithmetic parsing, so malformed input is a typed error
//! rather than a panic.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::elements::DATETIME;
use crate::error::{ParseError, Result};

pub fn encode(value: &NaiveDateTime) -> String {
    let value = truncate(*value);
    let year = i64::from(value.year());
    let sign = if year < 0 { "-" } else { "" };
    format!(
        "{sign}{:04}{:02}{:02}T{:02}:{:02}:{:02}",
        year.abs(),
        value.month(),
        value.day(),
        value.hour(),
        value.minute(),
        value.second()
    )
}

pub fn decode(text: &str) -> Result<NaiveDateTime> {
    let bad = || ParseError::bad_content(DATETIME, text);

    let (date, time) = text.split_once('T').ok_or_else(bad)?;
    let (negative_year, digits) = match date.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, date),
    };
    // Variable-length year; the last four digits before `T` are month+day.
    if digits.len() < 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let time_bytes = time.as_bytes();
    if time_bytes.len() != 8 || time_bytes[2] != b':' || time_bytes[5] != b':' {
        return Err(bad());
    }
    for (index, byte) in time_bytes.iter().enumerate() {
        if index != 2 && index != 5 && !byte.is_ascii_digit() {
            return Err(bad());
        }
    }

    let split = digits.len() - 4;
    let year: i32 = digits[..split].parse().map_err(|_| bad())?;
    let year = if negative_year { -year } else { year };
    let month: u32 = digits[split..split + 2].parse().map_err(|_| bad())?;
    let day: u32 = digits[split + 2..].parse().map_err(|_| bad())?;
    let hour: u32 = time[..2].parse().map_err(|_| bad())?;
    let minute: u32 = time[3..5].parse().map_err(|_| bad())?;
    let second: u32 = time[6..].parse().map_err(|_| bad())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(bad)
}

/// Truncate to the second precision the wire form can carry.
pub fn truncate(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}
