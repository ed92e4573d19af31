//! Transcript parser: wires normalization, segmentation and attribution.

use super::attribution::attribute;
use super::model::{Block, ImportLog, Session};
use super::normalize::split_lines;
use super::segmenter::{BlockMarker, Segmenter};
use super::trailer::TrailerClassifier;
use crate::config::Config;
use crate::error::EngineError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Result of one parsing run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub blocks: Vec<Block>,
    pub log: ImportLog,
}

/// Turns chat-export transcripts into attributed delivery blocks.
///
/// Holds only read-only configuration; every call owns its scan state, so
/// one parser can serve several transcripts (or threads) at once.
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    classifier: TrailerClassifier,
    marker: BlockMarker,
    lookahead: usize,
}

impl TranscriptParser {
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            classifier: TrailerClassifier::new(config)?,
            marker: BlockMarker::new(&config.marker)?,
            lookahead: config.trailer_lookahead,
        })
    }

    /// Segment a transcript into sessions without attributing them.
    pub fn sessions(&self, text: &str) -> Vec<Session> {
        let lines = split_lines(text);
        Segmenter::new(&self.classifier, &self.marker, self.lookahead).segment(&lines)
    }

    /// Parse already-decoded transcript text. `source` names it in the log.
    pub fn parse_str(&self, source: &str, text: &str) -> ParseOutcome {
        let blocks = attribute(self.sessions(text));
        let log = ImportLog::from_blocks(content_id(text), source, &blocks);

        info!(
            source,
            blocks = log.total_blocks,
            ok = log.ok_blocks,
            with_issues = log.blocks_with_issues,
            pending = log.pending_blocks,
            "transcript parsed"
        );

        ParseOutcome { blocks, log }
    }

    /// Read and parse a UTF-8 transcript file.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutcome, EngineError> {
        let bytes = fs::read(path).map_err(|source| EngineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|source| EngineError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.parse_str(&source, &text))
    }
}

/// Stable identifier for a transcript's content.
fn content_id(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes()).to_hex();
    hash.as_str()[..16].to_string()
}
