//! Plain-text rendering for terminal output.

use crate::transcript::{Block, ParseOutcome, ReviewStat};
use std::fmt::Write;

const RULE_WIDTH: usize = 50;

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Blocks (up to `limit`, 0 = all) followed by the import summary.
pub fn render_blocks(outcome: &ParseOutcome, limit: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    let shown = if limit == 0 {
        outcome.blocks.len()
    } else {
        limit.min(outcome.blocks.len())
    };

    let _ = writeln!(out, "Found {} delivery blocks:\n", outcome.blocks.len());
    for (i, block) in outcome.blocks.iter().take(shown).enumerate() {
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "BLOCK {} | ID: {} | Driver: {} | Date: {} | Review: {}",
            i + 1,
            block.id,
            or_dash(block.driver.clone()),
            or_dash(block.date_string()),
            block.review.status
        );
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{}", block.text);
        for issue in &block.issues {
            let _ = writeln!(
                out,
                "  ! [{}] {} (line {}): {}",
                issue.severity, issue.kind, issue.line, issue.description
            );
        }
        let _ = writeln!(out);
    }

    if shown < outcome.blocks.len() {
        let _ = writeln!(out, "... and {} more blocks\n", outcome.blocks.len() - shown);
    }

    let log = &outcome.log;
    let _ = writeln!(
        out,
        "Import {} ({}): {} blocks, {} ok, {} with issues, {} pending review",
        log.id,
        log.source,
        log.total_blocks,
        log.ok_blocks,
        log.blocks_with_issues,
        log.pending_blocks
    );
    out
}

/// One line per pending block plus its issue description.
pub fn render_queue(queue: &[&Block]) -> String {
    if queue.is_empty() {
        return "No blocks pending review.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} blocks pending review:\n", queue.len());
    for block in queue {
        let severity = block
            .review
            .severity
            .map(|s| s.to_string())
            .unwrap_or_default();
        let category = block
            .review
            .category
            .map(|c| c.to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:>3} | {:8} | {:17} | {:8} | {} | line {}",
            block.id,
            severity,
            category,
            or_dash(block.driver.clone()),
            or_dash(block.date_string()),
            block.start_line
        );
        if let Some(description) = &block.review.description {
            let _ = writeln!(out, "        Issue: {}", description);
        }
        if let Some(note) = &block.review.note {
            let _ = writeln!(out, "        Note: {}", note);
        }
    }
    out
}

/// Table of review statistics.
pub fn render_stats(stats: &[ReviewStat]) -> String {
    if stats.is_empty() {
        return "No blocks.\n".to_string();
    }

    let mut out = String::new();
    for stat in stats {
        let severity = stat.severity.map(|s| s.to_string());
        let category = stat.category.map(|c| c.to_string());
        let _ = writeln!(
            out,
            "  {:8} | {:8} | {:17} | {:5} ({}%)",
            stat.status.as_str(),
            or_dash(severity),
            or_dash(category),
            stat.total,
            stat.percent
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::transcript::{review_queue, review_stats, ReviewFilter, TranscriptParser};

    const TEXT: &str = "\
[02/01/26, 10:00:00] Ana: Rua A 10
🏎️1
[02/01/26, 10:01:00] Ana: Essas foram da Rodrigo, quinta
Rua B 20
🏎️2";

    fn outcome() -> ParseOutcome {
        TranscriptParser::new(&Config::default())
            .unwrap()
            .parse_str("chat.txt", TEXT)
    }

    #[test]
    fn test_render_blocks() {
        let out = render_blocks(&outcome(), 0);
        assert!(out.starts_with("Found 2 delivery blocks:"));
        assert!(out.contains("BLOCK 1 | ID: 001 | Driver: RODRIGO | Date: 01/01/2026 | Review: ok"));
        assert!(out.contains("BLOCK 2 | ID: 002 | Driver: - | Date: - | Review: pending"));
        assert!(out.contains("! [critical] missing_driver"));
        assert!(out.contains("2 blocks, 1 ok, 1 with issues, 1 pending review"));
    }

    #[test]
    fn test_render_blocks_limit() {
        let out = render_blocks(&outcome(), 1);
        assert!(out.contains("BLOCK 1"));
        assert!(!out.contains("BLOCK 2"));
        assert!(out.contains("... and 1 more blocks"));
    }

    #[test]
    fn test_render_queue() {
        let outcome = outcome();
        let queue = review_queue(&outcome.blocks, &ReviewFilter::default());
        let out = render_queue(&queue);
        assert!(out.starts_with("1 blocks pending review:"));
        assert!(out.contains("002 | critical"));
        assert!(out.contains("Issue: "));
    }

    #[test]
    fn test_render_empty_queue() {
        assert_eq!(render_queue(&[]), "No blocks pending review.\n");
    }

    #[test]
    fn test_render_stats() {
        let outcome = outcome();
        let out = render_stats(&review_stats(&outcome.blocks));
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("pending"));
        assert!(out.contains("50%"));
    }
}
