//! Utsushi main entry point
//!
//! This is the command-line interface for the Utsushi crawler and mirror
//! builder.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;
use utsushi::config::{load_config_with_hash, validate, Config, ReportFormat};
use utsushi::crawler::{parse_local_file, run_crawl, ExtractionRules};
use utsushi::output::{print_summary, write_report, CrawlResult};

/// Utsushi: a polite site crawler and offline mirror builder
///
/// Utsushi walks a website breadth-first, staying on the seed's host, and
/// reports the links, resources and contact details it finds. With
/// `--mirror` it also writes a browsable offline copy.
#[derive(Parser, Debug)]
#[command(name = "utsushi")]
#[command(version)]
#[command(about = "A polite site crawler and offline mirror builder", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site starting from a seed URL
    Crawl(CrawlArgs),

    /// Extract links and metadata from a local HTML file
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum crawl depth (seed is depth 0)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Minimum delay between requests, in seconds
    #[arg(long)]
    delay: Option<f64>,

    /// Write an offline mirror of the crawled pages
    #[arg(long)]
    mirror: bool,

    /// Mirror root directory
    #[arg(long, value_name = "DIR")]
    mirror_dir: Option<String>,

    /// Local HTML file to use instead of the online content of matching pages
    #[arg(long, value_name = "FILE")]
    index_override: Option<String>,

    /// Pages the override applies to: "seed", "all" or an absolute URL
    #[arg(long, value_name = "SCOPE")]
    override_scope: Option<String>,

    /// Stop after processing this many pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    max_duration: Option<u64>,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// HTML file to parse
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// URL relative links resolve against (defaults to the file's own URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Write a report to this path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Json,
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Markdown => ReportFormat::Markdown,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_base_config(cli.config.as_deref())?;

    match cli.command {
        Command::Crawl(args) => handle_crawl(config, args, cli.quiet).await,
        Command::Parse(args) => handle_parse(config, args, cli.quiet),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("utsushi=info,warn"),
            1 => EnvFilter::new("utsushi=debug,info"),
            2 => EnvFilter::new("utsushi=trace,debug"),
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

/// Loads the configuration file if one was given, otherwise the defaults
fn load_base_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the crawl subcommand
async fn handle_crawl(mut config: Config, args: CrawlArgs, quiet: bool) -> anyhow::Result<()> {
    if let Some(depth) = args.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(delay) = args.delay {
        config.crawler.delay_seconds = delay;
    }
    if args.max_pages.is_some() {
        config.crawler.max_pages = args.max_pages;
    }
    if args.max_duration.is_some() {
        config.crawler.max_duration_seconds = args.max_duration;
    }
    if args.mirror {
        config.mirror.enabled = true;
    }
    if let Some(dir) = args.mirror_dir {
        config.mirror.root_dir = dir;
    }
    if args.index_override.is_some() {
        config.mirror.index_override = args.index_override;
    }
    if let Some(scope) = args.override_scope {
        config.mirror.override_scope = scope;
    }
    apply_report_args(&mut config, &args.report);

    validate(&config).context("Invalid configuration")?;

    let result = run_crawl(&args.url, config.clone()).await?;
    finish(&config, &result, quiet)
}

/// Handles the parse subcommand
fn handle_parse(mut config: Config, args: ParseArgs, quiet: bool) -> anyhow::Result<()> {
    apply_report_args(&mut config, &args.report);
    validate(&config).context("Invalid configuration")?;

    let base_url = args
        .base_url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("Invalid --base-url")?;

    let rules = ExtractionRules::from_config(&config);
    let result = parse_local_file(&args.file, base_url.as_ref(), &rules)?;
    finish(&config, &result, quiet)
}

fn apply_report_args(config: &mut Config, report: &ReportArgs) {
    if report.output.is_some() {
        config.output.report_path = report.output.clone();
    }
    if let Some(format) = report.format {
        config.output.format = format.into();
    }
}

/// Writes the configured report and prints the console summary
fn finish(config: &Config, result: &CrawlResult, quiet: bool) -> anyhow::Result<()> {
    if let Some(path) = &config.output.report_path {
        write_report(result, Path::new(path), config.output.format)
            .with_context(|| format!("Failed to write report to {}", path))?;
    }

    if !quiet {
        print_summary(result);
        if let Some(mirror) = &result.mirror {
            if let Some(index) = &mirror.index_path {
                println!("\nMirror index: {}", index.display());
            }
        }
    }

    Ok(())
}
