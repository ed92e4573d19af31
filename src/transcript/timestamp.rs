//! Bracketed message timestamps at the start of an exported line.
//!
//! Timestamps are a best-effort signal: anything that fails to parse is
//! treated as "no timestamp" rather than an error.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

/// `[DD/MM/YY, HH:MM:SS]`
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{2}/\d{2}/\d{2}), (\d{2}:\d{2}:\d{2})\]").expect("valid timestamp pattern")
});

/// `[YYYY-MM-DD, H:MM:SS AM]`, the space before the meridiem may be a
/// (narrow) no-break space or missing.
static ISO_MERIDIEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(\d{4}-\d{1,2}-\d{1,2}), (\d{1,2}:\d{2}:\d{2})[ \x{202F}\x{00A0}]?([AaPp][Mm])\]")
        .expect("valid timestamp pattern")
});

/// Parse the timestamp prefix of a normalized line, if any.
pub fn extract_timestamp(line: &str) -> Option<NaiveDateTime> {
    parse_day_first(line).or_else(|| parse_iso_meridiem(line))
}

fn parse_day_first(line: &str) -> Option<NaiveDateTime> {
    let caps = DAY_FIRST.captures(line)?;
    let raw = format!("{} {}", &caps[1], &caps[2]);
    NaiveDateTime::parse_from_str(&raw, "%d/%m/%y %H:%M:%S").ok()
}

fn parse_iso_meridiem(line: &str) -> Option<NaiveDateTime> {
    let caps = ISO_MERIDIEM.captures(line)?;
    let raw = format!("{} {} {}", &caps[1], &caps[2], caps[3].to_ascii_uppercase());
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %I:%M:%S %p").ok()
}
