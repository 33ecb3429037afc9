//! Bounded top-K selection over an arrival-ordered stream.
//!
//! Residents are kept ascending by score, equal scores in insertion order.
//! Once full, a candidate must score strictly above the current floor to get
//! in; a candidate that ties the floor is dropped and the resident stays.
//! `finalize` reverses the ascending list, so among equal scores the later
//! arrival ranks higher. A selector sorting descending from the start would
//! have to break ties by descending sequence to produce the same output.

use lr_core::{Score, ScoredItem};
use tracing::trace;

use crate::TopKConfig;

/// What happened to an offered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The selector had room.
    Inserted,
    /// The item beat the floor and pushed the lowest resident out.
    Replaced { evicted: ScoredItem },
    /// The item did not beat the floor; it is handed back to the caller.
    Rejected(ScoredItem),
}

impl OfferOutcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, OfferOutcome::Rejected(_))
    }
}

#[derive(Debug, Clone)]
pub struct TopKSelector {
    capacity: usize,
    items: Vec<ScoredItem>,
}

impl TopKSelector {
    pub fn new(cfg: TopKConfig) -> Self {
        Self {
            capacity: cfg.k,
            items: Vec::with_capacity(cfg.k),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Score of the lowest resident, defined only while the selector is full.
    pub fn threshold(&self) -> Option<Score> {
        if self.is_full() {
            self.items.first().map(|item| item.score)
        } else {
            None
        }
    }

    /// Residents in ascending order, lowest first.
    pub fn items(&self) -> &[ScoredItem] {
        &self.items
    }

    pub fn offer(&mut self, item: ScoredItem) -> OfferOutcome {
        if !self.is_full() {
            trace!(score = item.score, sequence = item.sequence, "inserted");
            self.insert_sorted(item);
            return OfferOutcome::Inserted;
        }

        // Strictly greater: a tie at the floor never displaces a resident.
        match self.threshold() {
            Some(floor) if item.score > floor => {
                let evicted = self.items.remove(0);
                trace!(
                    score = item.score,
                    sequence = item.sequence,
                    evicted = evicted.sequence,
                    "replaced floor"
                );
                self.insert_sorted(item);
                OfferOutcome::Replaced { evicted }
            }
            _ => OfferOutcome::Rejected(item),
        }
    }

    /// Residents highest first. Does not consume the selector and returns the
    /// same list until the next `offer`.
    pub fn finalize(&self) -> Vec<ScoredItem> {
        self.items.iter().rev().cloned().collect()
    }

    // Same placement as appending and stable-sorting by score: after every
    // resident whose score is less than or equal to the new one.
    fn insert_sorted(&mut self, item: ScoredItem) {
        let at = self.items.partition_point(|resident| resident.score <= item.score);
        self.items.insert(at, item);
    }
}
