//! Stringification rules shared by table cells and plain-text output.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// `None` renders as an empty string.
pub fn ptr_string<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn ptr_string_default<T: Display>(value: Option<T>, default: &str) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Human-readable byte count using 1024-based units, e.g. `1.50KB`.
pub fn byte_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2}{}", value, UNITS[unit])
}

/// Negative or missing sizes fall back to `default`.
pub fn byte_size_default(bytes: Option<i64>, default: &str) -> String {
    match bytes {
        Some(b) if b >= 0 => byte_size(b as u64),
        _ => default.to_string(),
    }
}

pub fn join_option(values: Option<&[String]>, sep: &str) -> String {
    values.map(|v| v.join(sep)).unwrap_or_default()
}

pub fn date_time_string<Tz: TimeZone>(value: Option<&DateTime<Tz>>) -> String
where
    Tz::Offset: Display,
{
    value
        .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Cuts `s` to at most `n` characters, marking the cut with `...`.
pub fn truncate(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        return s.to_string();
    }
    let kept: String = s.chars().take(n).collect();
    format!("{}...", kept)
}

pub fn user_agent(cli_version: &str) -> String {
    format!("stackit-cli/{}", cli_version)
}
