//! Ranked views over a stream of scored items.

use serde::{Deserialize, Serialize};

pub mod top_k;

pub use top_k::{OfferOutcome, TopKSelector};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopKConfig {
    pub k: usize,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self { k: 10 }
    }
}
