use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing::info;

use lr_report::{Ranking, ReportWriter};
use lr_runtime::{init_tracing, MetricsRegistry, RunTimer};
use lr_sources::{DataSource, FetchError, SnapshotSource, VkConfig, VkSource};
use lr_views::TopKConfig;
use lr_walker::{RankMode, StreamWalker, WalkError, WalkerConfig};

/// Top posts and comments of a VK community by likes.
#[derive(Parser, Debug)]
#[command(name = "likerank", version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["posts", "comments", "description"])
))]
struct Args {
    /// Rank the most recent posts by likes
    #[arg(short, long)]
    posts: bool,

    /// Rank the comments under the most recent posts by likes
    #[arg(short, long)]
    comments: bool,

    /// Write the community description
    #[arg(short, long)]
    description: bool,

    /// Community short name
    domain: String,

    /// API access token
    #[arg(long, env = "VK_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    #[arg(long, default_value = "https://api.vk.com/method/")]
    endpoint: String,

    #[arg(long, default_value = "5.131")]
    api_version: String,

    /// Posts fetched in the single batch
    #[arg(long, default_value_t = 100)]
    batch_size: u32,

    /// How many items to keep
    #[arg(long, default_value_t = 10)]
    top: usize,

    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Read posts and comments from a JSON snapshot instead of the API
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

enum Section {
    Ranking(RankMode, Ranking),
    Description(String),
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    info!(domain = %args.domain, "likerank starting");

    let timer = RunTimer::start();
    let metrics = MetricsRegistry::default();

    let source: Box<dyn DataSource> = match &args.snapshot {
        Some(path) => Box::new(
            SnapshotSource::from_path(path)
                .with_context(|| format!("cannot load snapshot {}", path.display()))?,
        ),
        None => Box::new(VkSource::new(VkConfig {
            endpoint: args.endpoint.clone(),
            api_version: args.api_version.clone(),
            token: args.token.clone(),
            ..VkConfig::default()
        })?),
    };
    run(&args, &*source, &metrics)?;

    info!(
        metrics = %metrics.snapshot().to_json_line("likerank", Some(timer.elapsed())),
        output = %args.output.display(),
        "report written"
    );
    Ok(())
}

/// Fetches every selected section, then writes the report. A failed fetch
/// returns before the output file is created.
fn run(args: &Args, source: &dyn DataSource, metrics: &MetricsRegistry) -> Result<()> {
    let sections = collect_sections(args, source, metrics)?;
    write_report(args, &sections)
}

fn collect_sections(
    args: &Args,
    source: &dyn DataSource,
    metrics: &MetricsRegistry,
) -> Result<Vec<Section>> {
    let walker = StreamWalker::new(
        WalkerConfig {
            batch_size: args.batch_size,
            top_k: TopKConfig { k: args.top },
        },
        source,
    )
    .with_metrics(metrics.clone());

    let mut sections = Vec::new();
    for mode in selected_modes(args) {
        let items = walker.walk(&args.domain, mode).map_err(|err| {
            let hint = hint_for_walk_error(&err);
            anyhow::Error::new(err).context(hint)
        })?;
        sections.push(Section::Ranking(mode, Ranking::from_finalized(items)));
    }
    if args.description {
        let description = source.fetch_description(&args.domain).map_err(|err| {
            let hint = hint_for_fetch_error(&err);
            anyhow::Error::new(err).context(hint)
        })?;
        sections.push(Section::Description(description));
    }
    Ok(sections)
}

fn write_report(args: &Args, sections: &[Section]) -> Result<()> {
    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut report = ReportWriter::new(BufWriter::new(file));
    for section in sections {
        match section {
            Section::Ranking(mode, ranking) => report.write_ranking(*mode, ranking)?,
            Section::Description(text) => report.write_description(&args.domain, text)?,
        }
    }
    report.into_inner().flush()?;
    Ok(())
}

fn selected_modes(args: &Args) -> Vec<RankMode> {
    let mut modes = Vec::new();
    if args.posts {
        modes.push(RankMode::Posts);
    }
    if args.comments {
        modes.push(RankMode::Comments);
    }
    modes
}

fn hint_for_walk_error(err: &WalkError) -> &'static str {
    match err {
        WalkError::Fetch(fetch) => hint_for_fetch_error(fetch),
        WalkError::Record(_) => PARAMETERS_HINT,
    }
}

fn hint_for_fetch_error(err: &FetchError) -> &'static str {
    if err.is_connectivity() {
        CONNECTION_HINT
    } else {
        PARAMETERS_HINT
    }
}

const CONNECTION_HINT: &str = "Check your internet connection.";
const PARAMETERS_HINT: &str = "Check that the parameters are correct.";
