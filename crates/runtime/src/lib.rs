//! Process bootstrap shared by Like Rank binaries.

use tracing_subscriber::EnvFilter;

pub mod metrics;

pub use metrics::{MetricsRegistry, MetricsSnapshot, RunTimer};

const DEFAULT_DIRECTIVES: &str = "info";

/// Installs the global subscriber: `RUST_LOG` directives when set and valid,
/// `info` otherwise.
pub fn init_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}
