//! Opening-hours encoding.
//!
//! Times travel as integers built from the digits of an `HH:MM` string, so
//! `"14:30"` is stored as `1430` and `"09:30"` as `930`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("time is empty")]
    Empty,

    #[error("expected HH:MM, got '{0}'")]
    Format(String),

    #[error("'{0}' is not a valid time of day")]
    OutOfRange(String),
}

/// Parse an `HH:MM` string into its HHMM integer form.
pub fn parse_time(input: &str) -> Result<i32, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let (hours, minutes) = trimmed
        .split_once(':')
        .ok_or_else(|| TimeParseError::Format(trimmed.to_string()))?;

    let well_formed = (1..=2).contains(&hours.len())
        && minutes.len() == 2
        && hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit());
    if !well_formed {
        return Err(TimeParseError::Format(trimmed.to_string()));
    }

    // Digits only, so these cannot fail
    let h: i32 = hours.parse().map_err(|_| TimeParseError::Format(trimmed.to_string()))?;
    let m: i32 = minutes.parse().map_err(|_| TimeParseError::Format(trimmed.to_string()))?;

    let encoded = h * 100 + m;
    if !is_valid_hhmm(encoded) {
        return Err(TimeParseError::OutOfRange(trimmed.to_string()));
    }
    Ok(encoded)
}

/// Render an HHMM integer as a zero-padded `HH:MM` string.
pub fn format_time(hhmm: i32) -> String {
    format!("{:02}:{:02}", hhmm / 100, hhmm % 100)
}

/// True when the value names a real clock time between 0000 and 2359.
pub fn is_valid_hhmm(hhmm: i32) -> bool {
    (0..=2359).contains(&hhmm) && hhmm % 100 < 60
}
