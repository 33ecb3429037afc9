//! Core types for Like Rank: raw records, scored items and arrival sequencing.

use serde::{Deserialize, Serialize};

pub type Score = i64;
pub type Sequence = u64;

/// An item reduced to what the ranking needs: its score, its text and the
/// position at which it was offered to a selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredItem {
    pub score: Score,
    pub text: String,
    pub sequence: Sequence,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` has unexpected type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

pub mod record;
pub mod scored;

pub use record::RawRecord;
pub use scored::{Scored, SequenceCounter};
