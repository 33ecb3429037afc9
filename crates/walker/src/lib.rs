//! Walks a community's posts, or the comments under them, through a top-K selector.
//!
//! The walk is strictly sequential: posts in source order, and in comment mode
//! each post's comments in the order returned, before the next post is
//! fetched. That order fixes the arrival sequence, and with it every tie-break.

use std::fmt;

use lr_core::{RawRecord, RecordError, Scored, ScoredItem, SequenceCounter};
use lr_runtime::MetricsRegistry;
use lr_sources::{DataSource, FetchError};
use lr_views::{OfferOutcome, TopKConfig, TopKSelector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RankMode {
    /// Rank the posts of the batch.
    Posts,
    /// Rank the comments of every post in the batch.
    Comments,
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankMode::Posts => write!(f, "posts"),
            RankMode::Comments => write!(f, "comments"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Posts requested in the single batch fetch.
    pub batch_size: u32,
    pub top_k: TopKConfig,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            top_k: TopKConfig::default(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
}

pub struct StreamWalker<S> {
    cfg: WalkerConfig,
    source: S,
    metrics: MetricsRegistry,
}

impl<S: DataSource> StreamWalker<S> {
    pub fn new(cfg: WalkerConfig, source: S) -> Self {
        Self {
            cfg,
            source,
            metrics: MetricsRegistry::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsRegistry) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.cfg
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ranks one collection and returns its top items, highest first.
    ///
    /// Any fetch failure, or a record missing a field other than its score,
    /// ends the walk with no ranking.
    pub fn walk(&self, collection: &str, mode: RankMode) -> Result<Vec<ScoredItem>, WalkError> {
        let mut selector = TopKSelector::new(self.cfg.top_k);
        let mut sequence = SequenceCounter::new();

        let posts = self.source.fetch_batch(collection, self.cfg.batch_size)?;
        self.metrics.inc_batches_fetched(1);

        match mode {
            RankMode::Posts => {
                for post in &posts {
                    self.offer(&mut selector, &mut sequence, post)?;
                }
            }
            RankMode::Comments => {
                for post in &posts {
                    let desired = post.comments_count()?;
                    let comments = self
                        .source
                        .fetch_nested(post.id()?, post.owner_id()?, desired)?;
                    self.metrics.inc_nested_fetched(1);
                    for comment in &comments {
                        self.offer(&mut selector, &mut sequence, comment)?;
                    }
                }
            }
        }

        info!(
            %collection,
            %mode,
            offered = sequence.issued(),
            kept = selector.len(),
            threshold = ?selector.threshold(),
            "walk complete"
        );
        Ok(selector.finalize())
    }

    fn offer(
        &self,
        selector: &mut TopKSelector,
        sequence: &mut SequenceCounter,
        record: &RawRecord,
    ) -> Result<(), RecordError> {
        let defaulted = record.score().is_none();
        let item = sequence.extract(record)?;
        if defaulted {
            self.metrics.inc_scores_defaulted(1);
        }
        self.metrics.inc_items_offered(1);
        match selector.offer(item) {
            OfferOutcome::Inserted => self.metrics.inc_items_accepted(1),
            OfferOutcome::Replaced { evicted } => {
                self.metrics.inc_items_accepted(1);
                self.metrics.inc_items_evicted(1);
                debug!(score = evicted.score, sequence = evicted.sequence, "evicted");
            }
            OfferOutcome::Rejected(_) => self.metrics.inc_items_rejected(1),
        }
        Ok(())
    }
}
