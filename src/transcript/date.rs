//! Date phrase resolution.
//!
//! Explicit information always wins over relative information, and relative
//! resolution always leans toward the past:
//!
//! 1. `D/M[/Y]` literal
//! 2. `D do M` phrase
//! 3. a weekday name, resolved to its most recent occurrence on or before
//!    the reference point
//!
//! A literal without a year takes the reference year, rolled back one year
//! if that would put it after the reference date.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SLASH_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("valid date literal pattern")
});

static DAY_OF_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+do\s+(\d{1,2})\b").expect("valid day-of-month pattern")
});

/// Which rule of the cascade produced a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Literal,
    DayOfMonth,
    Weekday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub source: DateSource,
    /// The year was inferred and had to be moved back to stay in the past.
    pub year_rolled_back: bool,
}

impl ResolvedDate {
    /// `DD/MM/YYYY`
    pub fn formatted(&self) -> String {
        format_date(self.date)
    }
}

/// Format a date the way downstream consumers expect it: `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[derive(Debug, Clone)]
pub struct DateResolver {
    weekdays: BTreeMap<String, Weekday>,
    weekday_pattern: Option<Regex>,
}

impl DateResolver {
    pub fn new(weekdays: &BTreeMap<String, Weekday>) -> Result<Self, regex::Error> {
        let weekdays: BTreeMap<String, Weekday> = weekdays
            .iter()
            .map(|(name, day)| (name.trim().to_lowercase(), *day))
            .filter(|(name, _)| !name.is_empty())
            .collect();

        let weekday_pattern = if weekdays.is_empty() {
            None
        } else {
            // Longest names first.
            let mut names: Vec<&String> = weekdays.keys().collect();
            names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?)
        };

        Ok(Self {
            weekdays,
            weekday_pattern,
        })
    }

    /// Run the cascade against `text`.
    pub fn resolve(&self, text: &str, reference: Option<NaiveDateTime>) -> Option<ResolvedDate> {
        self.slash_literal(text, reference)
            .or_else(|| self.day_of_month(text, reference))
            .or_else(|| self.weekday_date(text, reference))
    }

    /// Same as [`resolve`](Self::resolve), formatted as `DD/MM/YYYY`.
    pub fn resolve_str(&self, text: &str, reference: Option<NaiveDateTime>) -> Option<String> {
        self.resolve(text, reference).map(|r| r.formatted())
    }

    /// The first weekday named in `text`.
    pub fn weekday_in(&self, text: &str) -> Option<Weekday> {
        let found = self.weekday_pattern.as_ref()?.find(text)?;
        self.weekdays.get(&found.as_str().to_lowercase()).copied()
    }

    /// True if `text` holds a `D/M[/Y]` literal, valid or not.
    pub fn has_date_literal(&self, text: &str) -> bool {
        SLASH_LITERAL.is_match(text)
    }

    /// A weekday named next to an explicit date that falls on another day.
    pub fn conflicting_weekday(&self, text: &str, resolved: &ResolvedDate) -> Option<Weekday> {
        if resolved.source == DateSource::Weekday {
            return None;
        }
        let named = self.weekday_in(text)?;
        (named != resolved.date.weekday()).then_some(named)
    }

    fn slash_literal(&self, text: &str, reference: Option<NaiveDateTime>) -> Option<ResolvedDate> {
        SLASH_LITERAL.captures_iter(text).find_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let year = match caps.get(3) {
                Some(y) => {
                    let y: i32 = y.as_str().parse().ok()?;
                    Some(if y < 100 { y + 2000 } else { y })
                }
                None => None,
            };
            let (date, year_rolled_back) = place_in_year(day, month, year, reference)?;
            Some(ResolvedDate {
                date,
                source: DateSource::Literal,
                year_rolled_back,
            })
        })
    }

    fn day_of_month(&self, text: &str, reference: Option<NaiveDateTime>) -> Option<ResolvedDate> {
        DAY_OF_MONTH.captures_iter(text).find_map(|caps| {
            let day = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let (date, year_rolled_back) = place_in_year(day, month, None, reference)?;
            Some(ResolvedDate {
                date,
                source: DateSource::DayOfMonth,
                year_rolled_back,
            })
        })
    }

    fn weekday_date(&self, text: &str, reference: Option<NaiveDateTime>) -> Option<ResolvedDate> {
        let target = self.weekday_in(text)?;
        let date = most_recent_weekday(target, reference?.date())?;
        Some(ResolvedDate {
            date,
            source: DateSource::Weekday,
            year_rolled_back: false,
        })
    }
}

/// Build a date from day/month and an optional explicit year. Without a
/// year, the reference year is used unless that lands after the reference
/// date (or does not exist, e.g. 29/02), in which case the previous year is
/// tried. Returns `None` when no year can be inferred.
fn place_in_year(
    day: u32,
    month: u32,
    year: Option<i32>,
    reference: Option<NaiveDateTime>,
) -> Option<(NaiveDate, bool)> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day).map(|d| (d, false));
    }

    let reference = reference?.date();
    match NaiveDate::from_ymd_opt(reference.year(), month, day) {
        Some(date) if date <= reference => Some((date, false)),
        _ => NaiveDate::from_ymd_opt(reference.year() - 1, month, day).map(|d| (d, true)),
    }
}

/// Most recent `target` on or before `reference`.
fn most_recent_weekday(target: Weekday, reference: NaiveDate) -> Option<NaiveDate> {
    let current = reference.weekday().num_days_from_monday();
    let wanted = target.num_days_from_monday();
    let back = (7 + current - wanted) % 7;
    reference.checked_sub_days(Days::new(u64::from(back)))
}
