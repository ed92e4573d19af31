//! Delivery transcript parsing.
//!
//! A chat export is cut into delivery blocks at the block marker; trailer
//! lines name the driver and date for the blocks before them. The result is
//! one [`Block`] per delivery plus an [`ImportLog`] listing every issue found
//! while attributing them.

mod attribution;
mod date;
mod driver;
mod model;
mod normalize;
mod parser;
pub mod review;
mod segmenter;
mod timestamp;
mod trailer;

pub use attribution::{attribute, review_for};
pub use date::{format_date, DateResolver, DateSource, ResolvedDate};
pub use driver::DriverDetector;
pub use model::{Block, ImportLog, Issue, IssueKind, Review, ReviewStatus, Session, Severity};
pub use normalize::{message_body, normalize_line, split_lines};
pub use parser::{ParseOutcome, TranscriptParser};
pub use review::{review_queue, review_stats, ReviewFilter, ReviewStat};
pub use segmenter::{BlockMarker, Segmenter};
pub use timestamp::extract_timestamp;
pub use trailer::{TrailerClassifier, TrailerInfo};
