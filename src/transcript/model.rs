//! Data produced by a parsing run: blocks, sessions, issues and the import log.

use super::date::ResolvedDate;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Issue severity. Variant order is the ranking: `Critical` is the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "critical" => Ok(Severity::Critical),
            other => Err(format!(
                "unknown severity '{}' (expected critical, warning or info)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingDate,
    MissingDriver,
    AmbiguousMatch,
    InferenceFallback,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingDate => "missing_date",
            IssueKind::MissingDriver => "missing_driver",
            IssueKind::AmbiguousMatch => "ambiguous_match",
            IssueKind::InferenceFallback => "inference_fallback",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One diagnostic finding about a block's driver/date attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub block_id: String,
    pub line: usize,
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    /// Value substituted for the missing one, if any.
    pub fallback_value: Option<String>,
    pub needs_review: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Ok,
    Pending,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Ok => "ok",
            ReviewStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review metadata derived from a block's issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub status: ReviewStatus,
    /// Severity of the worst issue.
    pub severity: Option<Severity>,
    /// Kind of the worst issue.
    pub category: Option<IssueKind>,
    pub description: Option<String>,
    pub note: Option<String>,
}

impl Default for Review {
    fn default() -> Self {
        Self {
            status: ReviewStatus::Ok,
            severity: None,
            category: None,
            description: None,
            note: None,
        }
    }
}

/// One delivery unit of raw text, terminated by the block marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Zero-padded delivery number, e.g. "007".
    pub id: String,
    /// Verbatim (normalized) lines joined with `\n`.
    pub text: String,
    /// 1-based line where the block starts in the source.
    pub start_line: usize,
    /// Index of the session this block belongs to.
    pub session: usize,
    pub driver: Option<String>,
    #[serde(with = "ddmmyyyy")]
    pub delivery_date: Option<NaiveDate>,
    /// Most recent timestamp seen while the block was being accumulated.
    pub fallback_timestamp: Option<NaiveDateTime>,
    pub issues: Vec<Issue>,
    pub review: Review,
}

impl Block {
    pub fn new(
        id: String,
        text: String,
        start_line: usize,
        fallback_timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            id,
            text,
            start_line,
            session: 0,
            driver: None,
            delivery_date: None,
            fallback_timestamp,
            issues: Vec::new(),
            review: Review::default(),
        }
    }

    /// Delivery date as `DD/MM/YYYY`.
    pub fn date_string(&self) -> Option<String> {
        self.delivery_date.map(super::date::format_date)
    }

    pub fn is_pending(&self) -> bool {
        self.review.status == ReviewStatus::Pending
    }
}

/// A run of blocks governed by the same trailer context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub blocks: Vec<Block>,
    pub driver: Option<String>,
    /// Every distinct driver named by the trailer lines that set `driver`.
    pub driver_candidates: Vec<String>,
    pub date: Option<ResolvedDate>,
    /// Weekday named beside an explicit date that falls on another day.
    pub weekday_conflict: Option<Weekday>,
    /// Most recent timestamp seen when the trailer was read.
    pub reference: Option<NaiveDateTime>,
    /// Line of the trailer that set the session context.
    pub trailer_line: Option<usize>,
}

impl Session {
    pub fn new(reference: Option<NaiveDateTime>) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    /// Driver or date is still unknown.
    pub fn needs_context(&self) -> bool {
        self.driver.is_none() || self.date.is_none()
    }
}

/// Summary of one parsing run, kept as an audit artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLog {
    /// Content hash of the transcript; identical input yields the same id.
    pub id: String,
    pub source: String,
    /// When the run happened. The engine leaves this unset so that runs
    /// are reproducible; callers stamp it before persisting.
    pub imported_at: Option<DateTime<Utc>>,
    pub total_blocks: usize,
    pub ok_blocks: usize,
    pub blocks_with_issues: usize,
    /// Blocks whose review status is pending.
    pub pending_blocks: usize,
    pub issues: Vec<Issue>,
}

impl ImportLog {
    pub fn from_blocks(id: String, source: &str, blocks: &[Block]) -> Self {
        let blocks_with_issues = blocks.iter().filter(|b| !b.issues.is_empty()).count();
        Self {
            id,
            source: source.to_string(),
            imported_at: None,
            total_blocks: blocks.len(),
            ok_blocks: blocks.len() - blocks_with_issues,
            blocks_with_issues,
            pending_blocks: blocks.iter().filter(|b| b.is_pending()).count(),
            issues: blocks.iter().flat_map(|b| b.issues.iter().cloned()).collect(),
        }
    }

    /// Copy of this log with the run time recorded.
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.imported_at = Some(at);
        self
    }

    /// Issues grouped per block id.
    pub fn issues_by_block(&self) -> BTreeMap<&str, Vec<&Issue>> {
        let mut grouped: BTreeMap<&str, Vec<&Issue>> = BTreeMap::new();
        for issue in &self.issues {
            grouped.entry(issue.block_id.as_str()).or_default().push(issue);
        }
        grouped
    }
}

/// Serde adapter for `Option<NaiveDate>` as `DD/MM/YYYY`.
mod ddmmyyyy {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
