//! web-census main entry point
//!
//! This is the command-line interface for the web-census domain crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use web_census::config::{load_config, validate, Config, RunLimits};
use web_census::crawler::run_crawl;
use web_census::output::print_statistics;

/// web-census: a polite single-domain census crawler
///
/// web-census crawls one domain breadth-first while respecting robots.txt,
/// counts internal pages, subdomains, external hosts and linked documents,
/// and reports broken pages.
#[derive(Parser, Debug)]
#[command(name = "web-census")]
#[command(version)]
#[command(about = "A polite single-domain census crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Target domain (overrides the config file)
    #[arg(long)]
    domain: Option<String>,

    /// First URL to fetch
    #[arg(long)]
    start_url: Option<String>,

    /// Maximum pages to fetch
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth from the start URL
    #[arg(long)]
    max_depth: Option<u32>,

    /// Delay before each request, in seconds
    #[arg(long)]
    delay: Option<f64>,

    /// Number of concurrent workers
    #[arg(long)]
    concurrency: Option<usize>,

    /// File receiving the extracted page text ("" disables it)
    #[arg(long)]
    output: Option<String>,

    /// Print the final statistics as JSON
    #[arg(long)]
    json: bool,

    /// Validate the configuration and show what would be crawled
    #[arg(long)]
    dry_run: bool,

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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    let stats = run_crawl(config).await.context("crawl could not start")?;

    if cli.json {
        println!("{}", stats.to_json()?);
    } else {
        print_statistics(&stats);
    }

    if let Some(error) = &stats.error {
        tracing::error!("Crawl ended with an error: {}", error);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("web_census=info,warn"),
            1 => EnvFilter::new("web_census=debug,info"),
            2 => EnvFilter::new("web_census=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match (&cli.config, &cli.domain) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        (None, Some(domain)) => Config::new(domain.clone()),
        (None, None) => bail!("either a CONFIG file or --domain is required"),
    };

    if let Some(domain) = &cli.domain {
        config.crawler.target_domain = domain.clone();
    }
    if let Some(start_url) = &cli.start_url {
        config.crawler.start_url = Some(start_url.clone());
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(delay) = cli.delay {
        config.crawler.request_delay = delay;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(output) = &cli.output {
        config.output.text_log_path = Some(output.clone());
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let limits = RunLimits::from_config(config)?;

    println!("=== web-census Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Target domain: {}", limits.target_domain());
    println!("  Domain match: {:?}", limits.domain_match());
    println!("  Start URL: {}", limits.start_url());
    println!("  Max pages: {}", limits.max_pages());
    println!("  Max depth: {}", limits.max_depth());
    println!("  Request delay: {:?}", limits.request_delay());
    println!("  Concurrency: {}", limits.concurrency());
    println!("  Page timeout: {:?}", limits.page_timeout());
    println!("  Max body size: {} bytes", limits.max_body_bytes());

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());
    println!("  robots.txt agent: {}", limits.robots_agent());
    println!(
        "  robots.txt: {}://<host>/robots.txt (timeout {:?})",
        limits.robots_scheme(),
        limits.robots_timeout()
    );

    println!("\nOutput:");
    match config.output.text_log() {
        Some(path) => println!("  Page text: {}", path),
        None => println!("  Page text: disabled"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}
