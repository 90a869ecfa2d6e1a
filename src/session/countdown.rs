//! `M:SS` countdown strings.

use crate::error::FormatError;

/// Parse a `M:SS` / `MM:SS` countdown into whole seconds.
///
/// Minutes are unbounded (`"120:00"` is valid); seconds must be two digits
/// below 60.
pub fn parse_countdown(s: &str) -> Result<u64, FormatError> {
    let invalid = || FormatError(s.to_string());
    let (minutes, seconds) = s.trim().split_once(':').ok_or_else(invalid)?;

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if seconds.len() != 2 || !seconds.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
    if seconds >= 60 {
        return Err(invalid());
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Format whole seconds as zero-padded `MM:SS`.
pub fn format_countdown(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Render a length in (possibly fractional) minutes as `M:SS`.
///
/// `25.0` becomes `"25:00"`, `1.5` becomes `"1:30"`.
pub fn minutes_to_countdown(minutes: f64) -> String {
    let total = (minutes.max(0.0) * 60.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
