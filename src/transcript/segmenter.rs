//! Single-pass scanner that cuts a transcript into blocks and sessions.
//!
//! Lines accumulate into a pending block until a line carrying the block
//! marker closes it. A trailer line sets the driver/date of the active
//! session; the next few trailer lines may fill in whatever is still
//! missing, after which the session is closed if it holds any block.

use super::model::{Block, Session};
use super::normalize::message_body;
use super::timestamp::extract_timestamp;
use super::trailer::TrailerClassifier;
use chrono::NaiveDateTime;
use regex::Regex;
use std::mem;
use tracing::{debug, trace};

/// Recognizes the block marker glyph, optionally next to a delivery number
/// (`3🏎️` or `🏎️ 3`).
#[derive(Debug, Clone)]
pub struct BlockMarker {
    presence: Regex,
    numbered: Regex,
}

impl BlockMarker {
    pub fn new(glyph: &str) -> Result<Self, regex::Error> {
        // The emoji variation selector is often dropped by exporters.
        let base = glyph.trim().trim_end_matches('\u{FE0F}');
        let glyph = format!(r"{}\x{{FE0F}}?", regex::escape(base));
        Ok(Self {
            presence: Regex::new(&glyph)?,
            numbered: Regex::new(&format!(r"(\d+)\s*{g}|{g}\s*(\d+)", g = glyph))?,
        })
    }

    /// `None` if the line has no marker, `Some(number)` otherwise.
    pub fn find<'a>(&self, line: &'a str) -> Option<Option<&'a str>> {
        if !self.presence.is_match(line) {
            return None;
        }
        let number = self
            .numbered
            .captures(line)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str());
        Some(number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Marker(Option<&'a str>),
    Trailer,
    Ignorable,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    /// Reading a trailer; `consumed` follow-up lines absorbed so far.
    Trailer { consumed: usize },
}

#[derive(Debug, Default)]
struct PendingBlock {
    lines: Vec<String>,
    start_line: Option<usize>,
    timestamp: Option<NaiveDateTime>,
}

impl PendingBlock {
    fn push(&mut self, line_no: usize, line: &str, timestamp: Option<NaiveDateTime>) {
        self.start_line.get_or_insert(line_no);
        if timestamp.is_some() {
            self.timestamp = timestamp;
        }
        self.lines.push(line.to_string());
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Per-run scan state. Nothing here outlives one call to `segment`.
struct ScanPass {
    state: ScanState,
    pending: PendingBlock,
    session: Session,
    sessions: Vec<Session>,
    /// Most recent timestamp seen on a non-ignorable line.
    reference: Option<NaiveDateTime>,
    last_number: u64,
}

impl ScanPass {
    fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            pending: PendingBlock::default(),
            session: Session::new(None),
            sessions: Vec::new(),
            reference: None,
            last_number: 0,
        }
    }

    fn observe(&mut self, timestamp: Option<NaiveDateTime>) {
        if timestamp.is_some() {
            self.reference = timestamp;
        }
    }

    fn close_block(&mut self, line_no: usize, number: Option<&str>) {
        let pending = mem::take(&mut self.pending);
        let id = match number {
            Some(digits) => {
                if let Ok(n) = digits.parse::<u64>() {
                    self.last_number = n;
                }
                format!("{:0>3}", digits)
            }
            None => {
                self.last_number = self.last_number.saturating_add(1);
                format!("{:03}", self.last_number)
            }
        };
        let start_line = pending.start_line.unwrap_or(line_no);
        debug!(block = %id, start_line, lines = pending.lines.len(), "block closed");

        let mut block = Block::new(id, pending.lines.join("\n"), start_line, pending.timestamp);
        block.session = self.sessions.len();
        self.session.blocks.push(block);
    }

    /// Emit the active session if it holds blocks and start a fresh one.
    fn close_session(&mut self) {
        if self.session.blocks.is_empty() {
            return;
        }
        let next = Session::new(self.reference);
        let done = mem::replace(&mut self.session, next);
        debug!(
            index = self.sessions.len(),
            blocks = done.blocks.len(),
            driver = ?done.driver,
            date = ?done.date.map(|d| d.formatted()),
            "session closed"
        );
        self.sessions.push(done);
    }

    fn finish(mut self) -> Vec<Session> {
        self.close_session();
        if !self.pending.is_empty() {
            debug!(
                lines = self.pending.lines.len(),
                start_line = ?self.pending.start_line,
                "discarding trailing lines without block marker"
            );
        }
        if self.session.driver.is_some() || self.session.date.is_some() {
            debug!("discarding trailer context with no blocks after it");
        }
        self.sessions
    }
}

/// Walks a transcript line by line and groups blocks into sessions.
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    classifier: &'a TrailerClassifier,
    marker: &'a BlockMarker,
    lookahead: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(classifier: &'a TrailerClassifier, marker: &'a BlockMarker, lookahead: usize) -> Self {
        Self {
            classifier,
            marker,
            lookahead,
        }
    }

    /// Segment normalized lines. Sessions without blocks are never returned.
    pub fn segment(&self, lines: &[String]) -> Vec<Session> {
        let mut pass = ScanPass::new();

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;
            let timestamp = extract_timestamp(line);
            let body = message_body(line);
            let kind = self.classify(body);

            if let ScanState::Trailer { consumed } = pass.state {
                if kind == LineKind::Trailer
                    && consumed < self.lookahead
                    && pass.session.needs_context()
                {
                    pass.observe(timestamp);
                    self.fill_missing(&mut pass, body, line_no);
                    pass.state = ScanState::Trailer {
                        consumed: consumed + 1,
                    };
                    continue;
                }
                if kind == LineKind::Ignorable {
                    trace!(line = line_no, "ignored inside trailer");
                    continue;
                }
                pass.close_session();
                pass.state = ScanState::Scanning;
            }

            match kind {
                LineKind::Trailer => {
                    pass.observe(timestamp);
                    self.apply_trailer(&mut pass, body, line_no);
                    pass.state = ScanState::Trailer { consumed: 0 };
                }
                LineKind::Ignorable => {
                    trace!(line = line_no, "ignored");
                }
                LineKind::Marker(number) => {
                    pass.observe(timestamp);
                    pass.pending.push(line_no, line, timestamp);
                    pass.close_block(line_no, number);
                }
                LineKind::Content => {
                    pass.observe(timestamp);
                    pass.pending.push(line_no, line, timestamp);
                }
            }
        }

        pass.finish()
    }

    fn classify<'b>(&self, body: &'b str) -> LineKind<'b> {
        if let Some(number) = self.marker.find(body) {
            return LineKind::Marker(number);
        }
        if self.classifier.is_trailer(body) {
            return LineKind::Trailer;
        }
        if self.classifier.is_ignorable(body) {
            return LineKind::Ignorable;
        }
        LineKind::Content
    }

    /// First trailer line of a group: its values replace the session's.
    fn apply_trailer(&self, pass: &mut ScanPass, body: &str, line_no: usize) {
        let info = self.classifier.read(body, pass.reference);
        debug!(
            line = line_no,
            drivers = ?info.drivers,
            date = ?info.date.map(|d| d.formatted()),
            "trailer"
        );

        let session = &mut pass.session;
        session.reference = pass.reference;
        session.trailer_line = Some(line_no);

        if let Some(driver) = info.driver() {
            let carried = session.driver.take().filter(|d| d != driver);
            session.driver = Some(driver.to_string());
            session.driver_candidates = info.drivers.clone();
            // A conflicting earlier trailer stays visible as a candidate.
            if let Some(carried) = carried {
                debug!(line = line_no, carried = %carried, "trailer overrides carried driver");
                if !session.driver_candidates.contains(&carried) {
                    session.driver_candidates.push(carried);
                }
            }
        }
        if let Some(date) = info.date {
            session.date = Some(date);
            session.weekday_conflict = info.weekday_conflict;
        }
    }

    /// Follow-up trailer line: only fills what the session still lacks.
    fn fill_missing(&self, pass: &mut ScanPass, body: &str, line_no: usize) {
        let info = self.classifier.read(body, pass.reference);
        debug!(
            line = line_no,
            drivers = ?info.drivers,
            date = ?info.date.map(|d| d.formatted()),
            "trailer continuation"
        );

        let session = &mut pass.session;
        session.reference = pass.reference;

        if session.driver.is_none() {
            if let Some(driver) = info.driver() {
                session.driver = Some(driver.to_string());
            }
        }
        if session.driver.is_some() {
            for name in &info.drivers {
                if !session.driver_candidates.contains(name) {
                    session.driver_candidates.push(name.clone());
                }
            }
        }
        if session.date.is_none() {
            if let Some(date) = info.date {
                session.date = Some(date);
                session.weekday_conflict = info.weekday_conflict;
            }
        }
    }
}
