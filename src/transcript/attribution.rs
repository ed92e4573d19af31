//! Session attribution and issue generation.
//!
//! Every block inherits its session's driver and date. Gaps are filled from
//! the block's own timestamp where possible and always reported as issues.

use super::date::{format_date, DateSource};
use super::model::{Block, Issue, IssueKind, Review, ReviewStatus, Session, Severity};
use chrono::Datelike;

/// Push session context into each block, record issues and derive review
/// metadata. Blocks come back in encounter order.
pub fn attribute(sessions: Vec<Session>) -> Vec<Block> {
    let mut blocks = Vec::new();
    for mut session in sessions {
        for mut block in std::mem::take(&mut session.blocks) {
            attribute_block(&mut block, &session);
            block.review = review_for(&block.issues);
            blocks.push(block);
        }
    }
    blocks
}

fn attribute_block(block: &mut Block, session: &Session) {
    block.driver = session.driver.clone();
    block.delivery_date = session.date.map(|d| d.date);
    let start_line = block.start_line;

    if block.delivery_date.is_none() {
        match block.fallback_timestamp {
            Some(ts) => {
                let fallback = format_date(ts.date());
                block.delivery_date = Some(ts.date());
                push_issue(
                    block,
                    start_line,
                    IssueKind::MissingDate,
                    Severity::Warning,
                    format!("No date in session trailer; using message timestamp {}", fallback),
                    Some(fallback),
                    false,
                );
            }
            None => push_issue(
                block,
                start_line,
                IssueKind::MissingDate,
                Severity::Critical,
                "No date in session trailer and no message timestamp to fall back on".to_string(),
                None,
                true,
            ),
        }
    }

    if block.driver.is_none() {
        push_issue(
            block,
            start_line,
            IssueKind::MissingDriver,
            Severity::Critical,
            "No driver named in session trailer".to_string(),
            None,
            true,
        );
    }

    let trailer_line = session.trailer_line.unwrap_or(start_line);

    if session.driver_candidates.len() > 1 {
        push_issue(
            block,
            trailer_line,
            IssueKind::AmbiguousMatch,
            Severity::Warning,
            format!(
                "Several drivers named for this session ({}); using {}",
                session.driver_candidates.join(", "),
                session.driver.as_deref().unwrap_or("none")
            ),
            session.driver.clone(),
            true,
        );
    }

    if let (Some(date), Some(weekday)) = (session.date, session.weekday_conflict) {
        push_issue(
            block,
            trailer_line,
            IssueKind::AmbiguousMatch,
            Severity::Info,
            format!(
                "Trailer names {} but {} falls on a {}; explicit date kept",
                weekday,
                date.formatted(),
                date.date.weekday()
            ),
            Some(date.formatted()),
            false,
        );
    }

    if let Some(date) = session.date.filter(|d| d.year_rolled_back) {
        let rule = match date.source {
            DateSource::Literal => "date literal",
            DateSource::DayOfMonth => "day-of-month phrase",
            DateSource::Weekday => "weekday",
        };
        push_issue(
            block,
            trailer_line,
            IssueKind::InferenceFallback,
            Severity::Info,
            format!(
                "Year missing from {}; assumed {} to keep the date in the past",
                rule,
                date.formatted()
            ),
            Some(date.formatted()),
            false,
        );
    }
}

fn push_issue(
    block: &mut Block,
    line: usize,
    kind: IssueKind,
    severity: Severity,
    description: String,
    fallback_value: Option<String>,
    needs_review: bool,
) {
    let issue = Issue {
        block_id: block.id.clone(),
        line,
        kind,
        severity,
        description,
        fallback_value,
        needs_review,
    };
    block.issues.push(issue);
}

/// Review metadata: pending iff any issue needs review; severity, category
/// and description come from the worst issue (first one on ties).
pub fn review_for(issues: &[Issue]) -> Review {
    let Some(worst) = issues
        .iter()
        .reduce(|best, i| if i.severity > best.severity { i } else { best })
    else {
        return Review::default();
    };

    let status = if issues.iter().any(|i| i.needs_review) {
        ReviewStatus::Pending
    } else {
        ReviewStatus::Ok
    };

    let note = match issues.len() {
        1 => worst.fallback_value.as_ref().map(|v| format!("fallback: {}", v)),
        n => Some(format!(
            "{} issues: {}",
            n,
            issues
                .iter()
                .map(|i| format!("{} ({})", i.kind, i.severity))
                .collect::<Vec<_>>()
                .join(", ")
        )),
    };

    Review {
        status,
        severity: Some(worst.severity),
        category: Some(worst.kind),
        description: Some(worst.description.clone()),
        note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::date::ResolvedDate;
    use chrono::{NaiveDate, NaiveDateTime, Weekday};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timestamp(y: i32, m: u32, d: u32) -> NaiveDateTime {
        day(y, m, d).and_hms_opt(10, 0, 0).unwrap()
    }

    fn block(id: &str, ts: Option<NaiveDateTime>) -> Block {
        Block::new(id.to_string(), format!("Rua A 🏎️{}", id), 1, ts)
    }

    fn session(blocks: Vec<Block>, driver: Option<&str>, date: Option<NaiveDate>) -> Session {
        Session {
            blocks,
            driver: driver.map(str::to_string),
            driver_candidates: driver.map(|d| vec![d.to_string()]).unwrap_or_default(),
            date: date.map(|date| ResolvedDate {
                date,
                source: DateSource::Literal,
                year_rolled_back: false,
            }),
            trailer_line: Some(5),
            ..Session::default()
        }
    }

    #[test]
    fn test_fully_resolved_block_has_no_issues() {
        let blocks = attribute(vec![session(
            vec![block("001", None)],
            Some("RODRIGO"),
            Some(day(2026, 1, 1)),
        )]);
        assert_eq!(blocks[0].driver.as_deref(), Some("RODRIGO"));
        assert_eq!(blocks[0].date_string().as_deref(), Some("01/01/2026"));
        assert!(blocks[0].issues.is_empty());
        assert_eq!(blocks[0].review, Review::default());
    }

    #[test]
    fn test_nothing_resolved_is_critical() {
        let blocks = attribute(vec![session(vec![block("002", None)], None, None)]);
        let b = &blocks[0];
        assert_eq!(b.driver, None);
        assert_eq!(b.delivery_date, None);
        let kinds: Vec<IssueKind> = b.issues.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![IssueKind::MissingDate, IssueKind::MissingDriver]);
        assert!(b
            .issues
            .iter()
            .all(|i| i.severity == Severity::Critical && i.needs_review));
        assert_eq!(b.review.status, ReviewStatus::Pending);
        assert_eq!(b.review.severity, Some(Severity::Critical));
        assert_eq!(b.review.category, Some(IssueKind::MissingDate));
    }

    #[test]
    fn test_timestamp_fallback_is_warning() {
        let blocks = attribute(vec![session(
            vec![block("003", Some(timestamp(2026, 1, 2)))],
            Some("KAROL"),
            None,
        )]);
        let b = &blocks[0];
        assert_eq!(b.date_string().as_deref(), Some("02/01/2026"));
        assert_eq!(b.issues.len(), 1);
        assert_eq!(b.issues[0].kind, IssueKind::MissingDate);
        assert_eq!(b.issues[0].severity, Severity::Warning);
        assert_eq!(b.issues[0].fallback_value.as_deref(), Some("02/01/2026"));
        assert!(!b.issues[0].needs_review);
        assert_eq!(b.review.status, ReviewStatus::Ok);
        assert_eq!(b.review.severity, Some(Severity::Warning));
        assert_eq!(b.review.note.as_deref(), Some("fallback: 02/01/2026"));
    }

    #[test]
    fn test_trailer_date_beats_timestamp() {
        let blocks = attribute(vec![session(
            vec![block("004", Some(timestamp(2026, 1, 2)))],
            Some("KAROL"),
            Some(day(2025, 12, 30)),
        )]);
        assert_eq!(blocks[0].date_string().as_deref(), Some("30/12/2025"));
        assert!(blocks[0].issues.is_empty());
    }

    #[test]
    fn test_ambiguous_drivers_need_review() {
        let mut s = session(vec![block("005", None)], Some("RAFA"), Some(day(2026, 1, 1)));
        s.driver_candidates = vec!["RAFA".to_string(), "KAROL".to_string()];
        let blocks = attribute(vec![s]);
        let b = &blocks[0];
        assert_eq!(b.issues.len(), 1);
        assert_eq!(b.issues[0].kind, IssueKind::AmbiguousMatch);
        assert_eq!(b.issues[0].line, 5);
        assert_eq!(b.review.status, ReviewStatus::Pending);
    }

    #[test]
    fn test_weekday_conflict_is_info() {
        let mut s = session(vec![block("006", None)], Some("RAFA"), Some(day(2025, 12, 31)));
        s.weekday_conflict = Some(Weekday::Thu);
        let blocks = attribute(vec![s]);
        let b = &blocks[0];
        assert_eq!(b.issues.len(), 1);
        assert_eq!(b.issues[0].severity, Severity::Info);
        assert!(!b.issues[0].needs_review);
        assert_eq!(b.review.status, ReviewStatus::Ok);
    }

    #[test]
    fn test_year_rollback_is_reported() {
        let mut s = session(vec![block("007", None)], Some("RAFA"), None);
        s.date = Some(ResolvedDate {
            date: day(2025, 12, 31),
            source: DateSource::Literal,
            year_rolled_back: true,
        });
        let blocks = attribute(vec![s]);
        assert_eq!(blocks[0].issues.len(), 1);
        assert_eq!(blocks[0].issues[0].kind, IssueKind::InferenceFallback);
        assert_eq!(
            blocks[0].issues[0].fallback_value.as_deref(),
            Some("31/12/2025")
        );
    }

    #[test]
    fn test_review_worst_issue_first_on_tie() {
        let mk = |kind: IssueKind, severity: Severity, needs_review: bool| Issue {
            block_id: "001".to_string(),
            line: 1,
            kind,
            severity,
            description: kind.to_string(),
            fallback_value: None,
            needs_review,
        };
        let issues = vec![
            mk(IssueKind::InferenceFallback, Severity::Info, false),
            mk(IssueKind::MissingDate, Severity::Critical, true),
            mk(IssueKind::MissingDriver, Severity::Critical, true),
        ];
        let review = review_for(&issues);
        assert_eq!(review.category, Some(IssueKind::MissingDate));
        assert_eq!(review.description.as_deref(), Some("missing_date"));
        assert_eq!(
            review.note.as_deref(),
            Some("3 issues: inference_fallback (info), missing_date (critical), missing_driver (critical)")
        );
    }

    #[test]
    fn test_review_pending_iff_needs_review() {
        let warning_only = Issue {
            block_id: "001".to_string(),
            line: 1,
            kind: IssueKind::MissingDate,
            severity: Severity::Warning,
            description: String::new(),
            fallback_value: None,
            needs_review: false,
        };
        assert_eq!(review_for(&[warning_only.clone()]).status, ReviewStatus::Ok);

        let flagged = Issue {
            needs_review: true,
            ..warning_only
        };
        assert_eq!(review_for(&[flagged]).status, ReviewStatus::Pending);
        assert_eq!(review_for(&[]).status, ReviewStatus::Ok);
    }

    #[test]
    fn test_blocks_keep_encounter_order() {
        let blocks = attribute(vec![
            session(vec![block("001", None), block("002", None)], Some("RAFA"), None),
            session(vec![block("003", None)], Some("KAROL"), None),
        ]);
        let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["001", "002", "003"]);
    }
}
