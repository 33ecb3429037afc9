//! Rendering of finished rankings as delimited text.
//!
//! A ranking section is a header row followed by `rank|score|text` rows with a
//! separator row between entries. A description section is a single
//! `label<community>:description` row.

use std::io::Write;

use lr_core::{Score, ScoredItem};
use lr_walker::RankMode;

pub const RANK_DELIMITER: u8 = b'|';
pub const DESCRIPTION_DELIMITER: u8 = b':';
pub const SEPARATOR: &str = "----------";
pub const DESCRIPTION_LABEL: &str = "Community description ";

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub rank: usize,
    pub score: Score,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    entries: Vec<RankedEntry>,
}

impl Ranking {
    /// Numbers a finalized, highest-first list starting at rank 1.
    pub fn from_finalized(items: Vec<ScoredItem>) -> Self {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| RankedEntry {
                rank: i + 1,
                score: item.score,
                text: item.text,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn header_for(mode: RankMode) -> [&'static str; 3] {
    match mode {
        RankMode::Posts => ["Place", "Likes", "Post text"],
        RankMode::Comments => ["Place", "Likes", "Comment text"],
    }
}

pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_ranking(&mut self, mode: RankMode, ranking: &Ranking) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(RANK_DELIMITER)
            .flexible(true)
            .has_headers(false)
            .from_writer(&mut self.out);
        csv.write_record(header_for(mode))?;
        for (i, entry) in ranking.entries().iter().enumerate() {
            if i > 0 {
                csv.write_record([SEPARATOR])?;
            }
            csv.serialize((entry.rank, entry.score, entry.text.as_str()))?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write_description(&mut self, collection: &str, description: &str) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(DESCRIPTION_DELIMITER)
            .has_headers(false)
            .from_writer(&mut self.out);
        csv.write_record([format!("{DESCRIPTION_LABEL}{collection}").as_str(), description])?;
        csv.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
