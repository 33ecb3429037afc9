use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Counters for one ranking run. Cloning shares the same counters.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    batches_fetched: AtomicU64,
    nested_fetched: AtomicU64,
    items_offered: AtomicU64,
    items_accepted: AtomicU64,
    items_evicted: AtomicU64,
    items_rejected: AtomicU64,
    scores_defaulted: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_batches_fetched(&self, delta: u64) {
        self.inner.batches_fetched.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_nested_fetched(&self, delta: u64) {
        self.inner.nested_fetched.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_items_offered(&self, delta: u64) {
        self.inner.items_offered.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_items_accepted(&self, delta: u64) {
        self.inner.items_accepted.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_items_evicted(&self, delta: u64) {
        self.inner.items_evicted.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_items_rejected(&self, delta: u64) {
        self.inner.items_rejected.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_scores_defaulted(&self, delta: u64) {
        self.inner.scores_defaulted.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_fetched: self.inner.batches_fetched.load(Ordering::Relaxed),
            nested_fetched: self.inner.nested_fetched.load(Ordering::Relaxed),
            items_offered: self.inner.items_offered.load(Ordering::Relaxed),
            items_accepted: self.inner.items_accepted.load(Ordering::Relaxed),
            items_evicted: self.inner.items_evicted.load(Ordering::Relaxed),
            items_rejected: self.inner.items_rejected.load(Ordering::Relaxed),
            scores_defaulted: self.inner.scores_defaulted.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_fetched: u64,
    pub nested_fetched: u64,
    pub items_offered: u64,
    pub items_accepted: u64,
    pub items_evicted: u64,
    pub items_rejected: u64,
    pub scores_defaulted: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Line<'a> {
            label: &'a str,
            #[serde(flatten)]
            counters: &'a MetricsSnapshot,
            elapsed_ms: Option<u128>,
        }

        let payload = Line {
            label,
            counters: self,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct RunTimer {
    start: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
