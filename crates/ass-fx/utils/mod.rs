//! Shared helpers for time conversion, numeric fields and whitespace
//!
//! Karaoke durations are written in centiseconds, script times as
//! `H:MM:SS.CC`; all internal computation happens in whole milliseconds.
//!
//! # Example
//!
//! ```rust
//! use ass_fx::utils::{parse_ass_time, ms_to_ass};
//!
//! let start_cs = parse_ass_time("0:01:30.50")?;
//! assert_eq!(start_cs, 9050);
//! assert_eq!(ms_to_ass(90_505), "0:01:30.51");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::str::FromStr;

pub mod errors;

pub use errors::{FxError, Result};

/// Parse ASS time format (H:MM:SS.CC) to centiseconds
///
/// # Example
///
/// ```rust
/// # use ass_fx::utils::parse_ass_time;
/// assert_eq!(parse_ass_time("0:01:30.50")?, 9050);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`FxError::InvalidTime`] if the time format is invalid or out of range.
pub fn parse_ass_time(time_str: &str) -> Result<u32> {
    let trimmed = time_str.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(FxError::invalid_time(trimmed, "expected H:MM:SS.CC"));
    }

    let hours: u32 = parts[0]
        .parse()
        .map_err(|_| FxError::invalid_time(trimmed, "invalid hours"))?;
    let minutes: u32 = parts[1]
        .parse()
        .map_err(|_| FxError::invalid_time(trimmed, "invalid minutes"))?;

    let (seconds_str, frac_str) = parts[2].split_once('.').unwrap_or((parts[2], ""));
    let seconds: u32 = seconds_str
        .parse()
        .map_err(|_| FxError::invalid_time(trimmed, "invalid seconds"))?;

    let centiseconds = match frac_str.len() {
        0 => 0,
        1 | 2 => {
            let value: u32 = frac_str
                .parse()
                .map_err(|_| FxError::invalid_time(trimmed, "invalid centiseconds"))?;
            if frac_str.len() == 1 {
                value * 10
            } else {
                value
            }
        }
        _ => return Err(FxError::invalid_time(trimmed, "too many decimal places")),
    };

    if minutes >= 60 {
        return Err(FxError::invalid_time(trimmed, "minutes must be < 60"));
    }
    if seconds >= 60 {
        return Err(FxError::invalid_time(trimmed, "seconds must be < 60"));
    }

    hours
        .checked_mul(360_000)
        .and_then(|h| h.checked_add(minutes * 6_000 + seconds * 100 + centiseconds))
        .ok_or_else(|| FxError::invalid_time(trimmed, "time overflows"))
}

/// Format centiseconds back to ASS time format
#[must_use]
pub fn format_ass_time(time_cs: u32) -> String {
    let hours = time_cs / 360_000;
    let minutes = (time_cs % 360_000) / 6_000;
    let seconds = (time_cs % 6_000) / 100;
    let cs = time_cs % 100;

    format!("{hours}:{minutes:02}:{seconds:02}.{cs:02}")
}

/// Convert centiseconds to milliseconds
#[must_use]
pub const fn cs_to_ms(cs: u32) -> u32 {
    cs.saturating_mul(10)
}

/// Convert milliseconds to centiseconds, rounding half up
#[must_use]
pub const fn ms_to_cs(ms: u32) -> u32 {
    ms.saturating_add(5) / 10
}

/// Format milliseconds as ASS time, rounded to the nearest centisecond
#[must_use]
pub fn ms_to_ass(ms: u32) -> String {
    format_ass_time(ms_to_cs(ms))
}

/// Apply a signed millisecond shift, clamping at zero
#[must_use]
pub fn shift_ms(ms: u32, shift: i32) -> u32 {
    let shifted = (i64::from(ms) + i64::from(shift)).max(0);
    u32::try_from(shifted).unwrap_or(u32::MAX)
}

/// Parse a numeric field, naming the field on failure
///
/// # Errors
///
/// Returns [`FxError::InvalidNumeric`] if `value` does not parse as `T`.
pub fn parse_field<T: FromStr>(value: &str, field: &str) -> Result<T> {
    let trimmed = value.trim();
    trimmed
        .parse()
        .map_err(|_| FxError::invalid_numeric(trimmed, &format!("invalid {field}")))
}

/// Parse an ASS boolean field (`-1`/`1` true, `0` false)
///
/// # Errors
///
/// Returns [`FxError::InvalidNumeric`] if `value` is not an integer.
pub fn parse_flag(value: &str, field: &str) -> Result<bool> {
    parse_field::<i32>(value, field).map(|v| v != 0)
}

/// Trim surrounding whitespace, reporting how many characters were removed
///
/// Returns `(trimmed, leading, trailing)`. An all-whitespace input counts
/// every character as leading.
#[must_use]
pub fn trim_space_count(text: &str) -> (&str, usize, usize) {
    let start = text.trim_start();
    let leading = text.chars().count() - start.chars().count();
    let trimmed = start.trim_end();
    let trailing = start.chars().count() - trimmed.chars().count();
    (trimmed, leading, trailing)
}
