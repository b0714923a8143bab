//! collatz-stats - Collatz sequence statistics
//!
//! A CLI tool and small HTTP API for analyzing Collatz (3n + 1)
//! trajectories, scanning ranges and finding the longest sequence in a range.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, configuration or runtime error

use anyhow::{Context, Result};
use chrono::Utc;
use collatz_stats::cli::{Args, Command, OutputFormat};
use collatz_stats::collatz::{RangeScanner, SequenceEngine};
use collatz_stats::config::{self, Config};
use collatz_stats::models::{
    LongestResponse, RangeReport, RangeSummary, ReportMetadata, SequenceAnalysis,
};
use collatz_stats::progress::ProgressObserver;
use collatz_stats::store::{self, JsonFileStore, RecordStore};
use collatz_stats::{report, server};
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config comes first so `[general] verbose` can pick the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));

    info!("collatz-stats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .collatz.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", config::CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    Ok(())
}

/// Pick the log level: `--quiet` wins, then `--verbose` or `[general] verbose`.
fn log_level(args: &Args, config: &Config) -> Level {
    if !args.quiet && config.general.verbose {
        Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging. `RUST_LOG` overrides the computed level.
fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch the selected subcommand.
async fn run(args: Args, config: Config) -> Result<()> {
    let engine = SequenceEngine::with_max_iterations(config.engine.max_iterations);
    match config.engine.max_iterations {
        Some(limit) => debug!("Iteration cap: {}", limit),
        None => debug!("Iteration cap: unbounded"),
    }

    let mut record_store = open_store(&config)?;

    match args.command.clone() {
        Some(Command::Analyze { number }) => {
            let analysis = engine.analyze(number)?;
            let output = match args.format {
                OutputFormat::Text => report::render_analysis_text(&analysis),
                OutputFormat::Json => report::generate_json_report(&analysis)?,
                OutputFormat::Markdown => report::render_analysis_markdown(&analysis),
            };
            write_output(&args, &output)
        }
        Some(Command::Batch { start, end }) => {
            let range_report = run_batch(&engine, &config, start, end)?;

            if let Some(store) = record_store.as_deref_mut() {
                let metadata = json!({ "source": "cli", "skipped": range_report.metadata.skipped });
                store::save_run(store, "batch", start, end, &range_report.results, metadata)?;
            }

            let output = match args.format {
                OutputFormat::Text => report::generate_text_report(&range_report),
                OutputFormat::Json => report::generate_json_report(&range_report)?,
                OutputFormat::Markdown => report::generate_markdown_report(&range_report),
            };
            write_output(&args, &output)
        }
        Some(Command::Longest { start, end }) => {
            let longest = run_longest(&engine, &config, record_store.as_deref_mut(), start, end)?;
            let output = render_longest(args.format, start, end, longest)?;
            write_output(&args, &output)
        }
        Some(Command::Serve { .. }) => server::serve(&config, record_store).await,
        None => anyhow::bail!("No command given"),
    }
}

/// Scan a range and build its report.
fn run_batch(engine: &SequenceEngine, config: &Config, start: i64, end: i64) -> Result<RangeReport> {
    let start_time = Instant::now();

    let observer = make_observer(config, start, end);
    let scanner = RangeScanner::new(*engine, &observer);
    let results = scanner.batch_analyze(start, end);
    observer.finish();
    let results = results?;

    let requested = range_size(start, end) as usize;
    let skipped = requested.saturating_sub(results.len());
    if skipped > 0 {
        warn!("Skipped {} numbers in {}..={}", skipped, start, end);
    }

    info!(
        "Analyzed {} sequences in {:.2}s",
        results.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(RangeReport {
        metadata: ReportMetadata {
            range_start: start,
            range_end: end,
            analysis_date: Utc::now(),
            max_iterations: engine.max_iterations(),
            skipped,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        summary: RangeSummary::from_analyses(&results),
        results,
    })
}

/// Find the longest sequence in a range.
///
/// With a store the whole range is analyzed so the saved run summary covers
/// every number in it, not just the winner.
fn run_longest(
    engine: &SequenceEngine,
    config: &Config,
    record_store: Option<&mut (dyn RecordStore + 'static)>,
    start: i64,
    end: i64,
) -> Result<Option<SequenceAnalysis>> {
    let Some(record_store) = record_store else {
        let observer = make_observer(config, start, end);
        let scanner = RangeScanner::new(*engine, &observer);
        let longest = scanner.find_longest(start, end);
        observer.finish();
        return Ok(longest?);
    };

    let range_report = run_batch(engine, config, start, end)?;
    let longest = range_report.summary.longest_starting_number.and_then(|n| {
        range_report
            .results
            .iter()
            .find(|analysis| analysis.starting_number == n)
            .cloned()
    });

    let metadata = json!({
        "source": "cli",
        "skipped": range_report.metadata.skipped,
        "longest_starting_number": range_report.summary.longest_starting_number,
    });
    store::save_run(record_store, "longest", start, end, &range_report.results, metadata)?;

    Ok(longest)
}

/// Render a longest-in-range result.
fn render_longest(
    format: OutputFormat,
    start: i64,
    end: i64,
    longest: Option<SequenceAnalysis>,
) -> Result<String> {
    Ok(match (format, longest) {
        (OutputFormat::Json, longest) => {
            report::generate_json_report(&LongestResponse::new(start, end, longest))?
        }
        (OutputFormat::Text, Some(analysis)) => format!(
            "Longest in {}..={}: {} (length {}, max {})\n",
            start, end, analysis.starting_number, analysis.length, analysis.max_value
        ),
        (OutputFormat::Markdown, Some(analysis)) => report::render_analysis_markdown(&analysis),
        (_, None) => format!("No sequence could be analyzed in {}..={}\n", start, end),
    })
}

/// Pick a progress bar for large scans, or a hidden one.
fn make_observer(config: &Config, start: i64, end: i64) -> ProgressObserver {
    let total = range_size(start, end);
    if config.general.progress && total > 1 {
        ProgressObserver::new(total)
    } else {
        ProgressObserver::hidden()
    }
}

/// Count of integers in `start..=end`.
fn range_size(start: i64, end: i64) -> u64 {
    if end < start {
        0
    } else {
        u64::try_from(end as i128 - start as i128 + 1).unwrap_or(u64::MAX)
    }
}

/// Print to stdout or write to the --output file.
fn write_output(args: &Args, output: &str) -> Result<()> {
    match args.output {
        Some(ref path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !args.quiet {
                println!("✅ Saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Open the record store if one is configured.
fn open_store(config: &Config) -> Result<Option<Box<dyn RecordStore>>> {
    let Some(ref dir) = config.store.directory else {
        return Ok(None);
    };

    let store = JsonFileStore::open(dir)?;
    if !store.check() {
        anyhow::bail!("Record store is not writable: {}", store.path().display());
    }
    Ok(Some(Box::new(store)))
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    Fallback(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", config::CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigSource::DefaultFile),
        Ok(None) => (Config::default(), ConfigSource::Builtin),
        Err(e) => (Config::default(), ConfigSource::Fallback(e)),
    })
}
