//! Novel-Ripple main entry point
//!
//! This is the command-line interface for the Novel-Ripple harvester.

use clap::{ArgGroup, Parser};
use novel_ripple::config::{load_config_with_hash, Config};
use novel_ripple::crawler::print_report;
use novel_ripple::{harvest, CrawlerRegistry, HarvestOptions, NovelCrawler, NovelReference, SortKey};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Keyword searches keep this many hits unless `--top` says otherwise
const DEFAULT_KEYWORD_TOP: usize = 10;

/// Novel-Ripple: a bounded-concurrency web novel harvester
///
/// Novel-Ripple finds novels on a fiction site by tag, author or keyword,
/// fetches their chapters concurrently and writes each novel to a text file
/// in reading order.
#[derive(Parser, Debug)]
#[command(name = "novel-ripple")]
#[command(version = "0.1.0")]
#[command(about = "A bounded-concurrency web novel harvester", long_about = None)]
#[command(group(
    ArgGroup::new("discovery")
        .required(true)
        .args(["tag", "author", "keyword", "url"])
))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Registered site to harvest from
    #[arg(long, default_value = "ujxsw")]
    site: String,

    /// Harvest every novel listed under these tags
    #[arg(long, num_args = 1..)]
    tag: Vec<String>,

    /// Harvest every novel by this author
    #[arg(long)]
    author: Option<String>,

    /// Harvest the best matches for this keyword
    #[arg(long)]
    keyword: Option<String>,

    /// Harvest these novel detail pages directly
    #[arg(long, num_args = 1..)]
    url: Vec<String>,

    /// Keep only the first N novels (after sorting, when --sort is given)
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Order novels before the --top cut, largest first
    #[arg(long, value_enum)]
    sort: Option<SortKey>,

    /// Run discovery only and list what would be harvested
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
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let registry = CrawlerRegistry::with_builtin_sites();
    let crawler = match registry.create(&cli.site, &config) {
        Ok(crawler) => crawler,
        Err(e) => {
            tracing::error!(
                "{} (available: {})",
                e,
                registry.site_names().join(", ")
            );
            return Err(e.into());
        }
    };

    let references = discover(crawler.as_ref(), &cli).await;

    if cli.dry_run {
        handle_dry_run(&config, &cli, &references);
    } else {
        handle_harvest(crawler.as_ref(), &cli, &references).await;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("novel_ripple=info,warn"),
            1 => EnvFilter::new("novel_ripple=debug,info"),
            2 => EnvFilter::new("novel_ripple=trace,debug"),
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

/// Runs the selected discovery mode
///
/// A failed listing is logged and contributes no novels.
async fn discover(crawler: &dyn NovelCrawler, cli: &Cli) -> Vec<NovelReference> {
    if !cli.url.is_empty() {
        return cli
            .url
            .iter()
            .map(|url| NovelReference::new("", "", url.as_str()))
            .collect();
    }

    let mut references = Vec::new();

    if let Some(author) = &cli.author {
        collect(&mut references, crawler.novels_by_author(author).await, author);
    }

    if let Some(keyword) = &cli.keyword {
        let top_n = cli.top.unwrap_or(DEFAULT_KEYWORD_TOP);
        collect(
            &mut references,
            crawler.novels_by_keyword(keyword, top_n).await,
            keyword,
        );
    }

    // With --sort the cut happens after enrichment, so list everything here
    let tag_top = if cli.sort.is_some() { None } else { cli.top };
    for tag in &cli.tag {
        collect(&mut references, crawler.novels_by_tag(tag, tag_top).await, tag);
    }

    references
}

fn collect(
    references: &mut Vec<NovelReference>,
    found: novel_ripple::Result<Vec<NovelReference>>,
    query: &str,
) {
    match found {
        Ok(found) => references.extend(found),
        Err(e) => tracing::error!("Discovery for '{}' failed: {}", query, e),
    }
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config, cli: &Cli, references: &[NovelReference]) {
    println!("=== Novel-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Site: {}", cli.site);
    println!(
        "  Metadata concurrency: {}",
        config.crawler.metadata_concurrency
    );
    println!(
        "  Chapter concurrency: {}",
        config.crawler.chapter_concurrency
    );
    println!("  File concurrency: {}", config.crawler.file_concurrency);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!("\nOutput:");
    println!("  Base directory: {}", config.output.base_dir);
    println!("  Existing files: {:?}", config.output.on_existing);

    println!("\nDiscovered Novels ({}):", references.len());
    for reference in references {
        println!(
            "  - {} / {} ({})",
            reference.title, reference.author, reference.detail_url
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(crawler: &dyn NovelCrawler, cli: &Cli, references: &[NovelReference]) {
    if references.is_empty() {
        tracing::warn!("Discovery found no novels; nothing to harvest");
        return;
    }

    let options = HarvestOptions {
        sort: cli.sort,
        top_n: cli.top,
    };
    let report = harvest(crawler, references, &options).await;
    print_report(&report);
}
