//! `wikiwalk` - shortest link path between two wiki articles.

use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wikiwalk::source::mediawiki::DEFAULT_ENDPOINT;
use wikiwalk::source::{MediaWikiConfig, MediaWikiSource, RetryPolicy, Retrying};
use wikiwalk::{WalkConfig, Walker};

/// Find the shortest chain of links from one article to another
#[derive(Parser, Debug)]
#[command(name = "wikiwalk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Article to start from
    from: String,

    /// Article to reach
    to: String,

    /// MediaWiki api.php endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT, env = "WIKIWALK_ENDPOINT")]
    endpoint: String,

    /// User agent sent with every request
    #[arg(long, env = "WIKIWALK_USER_AGENT")]
    user_agent: Option<String>,

    /// Maximum concurrent page fetches
    #[arg(long, default_value = "64", env = "WIKIWALK_MAX_IN_FLIGHT")]
    max_in_flight: usize,

    /// Give up on paths longer than this many links
    #[arg(long)]
    max_depth: Option<usize>,

    /// Retries per page on transient failures
    #[arg(long, default_value = "3")]
    retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Log every expanded article
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "wikiwalk=debug" } else { "wikiwalk=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = MediaWikiConfig::default().with_endpoint(args.endpoint.clone());
    if let Some(user_agent) = &args.user_agent {
        config = config.with_user_agent(user_agent.clone());
    }
    config.request_timeout = Some(Duration::from_secs(args.timeout_secs));

    let source = MediaWikiSource::new(config).context("Failed to build HTTP client")?;
    let source = Retrying::new(
        source,
        RetryPolicy {
            max_retries: args.retries,
            ..RetryPolicy::default()
        },
    );

    let mut walk_config = WalkConfig::default().with_max_in_flight(args.max_in_flight);
    if let Some(max_depth) = args.max_depth {
        walk_config = walk_config.with_max_depth(max_depth);
    }

    let walker = Walker::new(Arc::new(source)).with_config(walk_config);
    let path = walker
        .walk(&args.from, &args.to)
        .await
        .with_context(|| format!("Failed to walk from {}", args.from))?;

    match path {
        Some(path) => {
            println!("{path}");
            Ok(())
        }
        None => bail!("no path exists between {} and {}", args.from, args.to),
    }
}
