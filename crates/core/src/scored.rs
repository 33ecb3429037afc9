use crate::record::RawRecord;
use crate::{RecordError, Score, ScoredItem, Sequence};

/// Anything that can be ranked: a score that may be absent, and a text.
pub trait Scored {
    fn score(&self) -> Option<Score>;

    fn text(&self) -> Result<&str, RecordError>;

    /// An absent score ranks as zero; it is never an error.
    fn score_or_default(&self) -> Score {
        self.score().unwrap_or(0)
    }
}

impl Scored for RawRecord {
    fn score(&self) -> Option<Score> {
        self.likes_count()
    }

    fn text(&self) -> Result<&str, RecordError> {
        RawRecord::text(self)
    }
}

/// Hands out arrival sequence numbers for one selector, starting at 0.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    next: Sequence,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items extracted so far.
    pub fn issued(&self) -> Sequence {
        self.next
    }

    /// Turns a record into a `ScoredItem` stamped with the next sequence.
    ///
    /// A missing text aborts extraction and leaves the counter untouched.
    pub fn extract<R: Scored + ?Sized>(&mut self, record: &R) -> Result<ScoredItem, RecordError> {
        let text = record.text()?.to_owned();
        let item = ScoredItem {
            score: record.score_or_default(),
            text,
            sequence: self.next,
        };
        self.next = self.next.wrapping_add(1);
        Ok(item)
    }
}
