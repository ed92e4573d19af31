//! Review queue and review statistics over attributed blocks.

use super::model::{Block, IssueKind, ReviewStatus, Severity};
use serde::Serialize;
use std::collections::BTreeMap;

/// Narrow the review queue to one driver and/or severity.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub driver: Option<String>,
    pub severity: Option<Severity>,
}

impl ReviewFilter {
    fn matches(&self, block: &Block) -> bool {
        let driver_ok = match &self.driver {
            Some(wanted) => block
                .driver
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(wanted)),
            None => true,
        };
        let severity_ok = match self.severity {
            Some(wanted) => block.review.severity == Some(wanted),
            None => true,
        };
        driver_ok && severity_ok
    }
}

/// Pending blocks, worst severity first, encounter order within a severity.
pub fn review_queue<'a>(blocks: &'a [Block], filter: &ReviewFilter) -> Vec<&'a Block> {
    let mut queue: Vec<&Block> = blocks
        .iter()
        .filter(|b| b.is_pending() && filter.matches(b))
        .collect();
    queue.sort_by_key(|b| std::cmp::Reverse(b.review.severity));
    queue
}

/// Block count for one (status, severity, category) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStat {
    pub status: ReviewStatus,
    pub severity: Option<Severity>,
    pub category: Option<IssueKind>,
    pub total: usize,
    /// Share of all blocks, rounded to two decimals.
    pub percent: f64,
}

/// Group blocks by review status, severity and category; largest groups first.
pub fn review_stats(blocks: &[Block]) -> Vec<ReviewStat> {
    let mut groups: BTreeMap<(ReviewStatus, Option<Severity>, Option<IssueKind>), usize> =
        BTreeMap::new();
    for block in blocks {
        let key = (
            block.review.status,
            block.review.severity,
            block.review.category,
        );
        *groups.entry(key).or_default() += 1;
    }

    let all = blocks.len().max(1) as f64;
    let mut stats: Vec<ReviewStat> = groups
        .into_iter()
        .map(|((status, severity, category), total)| ReviewStat {
            status,
            severity,
            category,
            total,
            percent: (total as f64 * 10_000.0 / all).round() / 100.0,
        })
        .collect();
    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}
