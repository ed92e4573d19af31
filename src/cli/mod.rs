//! Command implementations behind the `courierlog` binary.

mod render;

use crate::transcript::{review_queue, review_stats, ParseOutcome, ReviewFilter, TranscriptParser};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use std::path::Path;

pub use render::{render_blocks, render_queue, render_stats};

fn load(parser: &TranscriptParser, path: &Path) -> Result<ParseOutcome> {
    let mut outcome = parser
        .parse_file(path)
        .with_context(|| format!("Failed to parse transcript: {}", path.display()))?;
    outcome.log = outcome.log.stamped(Utc::now());
    Ok(outcome)
}

/// Print blocks with their driver/date and the import summary.
/// `limit` caps the number of blocks shown in text mode (0 = all).
pub fn run_parse(parser: &TranscriptParser, path: &Path, limit: usize, as_json: bool) -> Result<()> {
    let outcome = load(parser, path)?;

    if as_json {
        let value = json!({ "blocks": outcome.blocks, "log": outcome.log });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render_blocks(&outcome, limit));
    }
    Ok(())
}

/// Print the blocks awaiting human review.
pub fn run_review(
    parser: &TranscriptParser,
    path: &Path,
    filter: &ReviewFilter,
    as_json: bool,
) -> Result<()> {
    let outcome = load(parser, path)?;
    let queue = review_queue(&outcome.blocks, filter);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&queue)?);
    } else {
        print!("{}", render_queue(&queue));
    }
    Ok(())
}

/// Print review counts grouped by status, severity and category.
pub fn run_stats(parser: &TranscriptParser, path: &Path, as_json: bool) -> Result<()> {
    let outcome = load(parser, path)?;
    let stats = review_stats(&outcome.blocks);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_stats(&stats));
    }
    Ok(())
}
