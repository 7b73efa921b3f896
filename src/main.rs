//! Trailmap main entry point
//!
//! This is the command-line interface for the Trailmap sitemap crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use trailmap::config::{load_config, Config};
use trailmap::crawler::run_crawl;
use trailmap::output::{default_sitemap_path, print_report, write_sitemap};
use tracing_subscriber::EnvFilter;

/// Trailmap: a bounded-concurrency sitemap crawler
///
/// Trailmap crawls a single host starting from a seed URL, following links
/// and bounded redirect chains, and writes a sitemap of what it found.
#[derive(Parser, Debug)]
#[command(name = "trailmap")]
#[command(version)]
#[command(about = "A bounded-concurrency sitemap crawler", long_about = None)]
struct Cli {
    /// Target root URL (http:// is assumed when no scheme is given)
    #[arg(value_name = "TARGET", required_unless_present = "config")]
    target: Option<String>,

    /// Path to a TOML configuration file; CLI flags override its values
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Limit redirect chains (for 301, 302 etc.)
    #[arg(long, value_name = "N")]
    max_redirect: Option<u32>,

    /// Limit concurrent workers
    #[arg(long, value_name = "N")]
    max_tasks: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Write the sitemap to this path instead of a timestamped file name
    #[arg(long, value_name = "PATH")]
    sitemap: Option<PathBuf>,

    /// Skip writing the sitemap file
    #[arg(long, conflicts_with = "sitemap")]
    no_sitemap: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    tracing::info!("crawling {}", config.crawler.target);
    let report = run_crawl(config.clone())
        .await
        .context("crawl failed to start")?;

    if !cli.quiet {
        print_report(&report);
    }

    if !cli.no_sitemap {
        let path = cli
            .sitemap
            .clone()
            .or_else(|| config.output.sitemap_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_sitemap_path);

        write_sitemap(&report, &path)
            .with_context(|| format!("failed to write sitemap to {}", path.display()))?;
        println!("Sitemap written to: {}", path.display());
    }

    Ok(())
}

/// Builds the effective configuration from the config file and CLI flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            // required_unless_present guarantees a target when no config
            // file is given.
            let target = cli.target.clone().unwrap_or_default();
            Config::for_target(fixup_target(&target))
        }
    };

    if let Some(target) = &cli.target {
        config.crawler.target = fixup_target(target);
    }
    if let Some(max_redirect) = cli.max_redirect {
        config.crawler.max_redirect = max_redirect;
    }
    if let Some(max_tasks) = cli.max_tasks {
        config.crawler.max_tasks = max_tasks;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(sitemap) = &cli.sitemap {
        config.output.sitemap_path = Some(sitemap.display().to_string());
    }

    trailmap::config::validate(&config).context("invalid configuration")?;

    Ok(config)
}

/// Prefixes a scheme-less target with http://
fn fixup_target(target: &str) -> String {
    if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trailmap=info,warn"),
            1 => EnvFilter::new("trailmap=debug,info"),
            2 => EnvFilter::new("trailmap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
