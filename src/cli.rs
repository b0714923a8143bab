//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// collatz-stats - Collatz sequence statistics
///
/// Analyze single trajectories, scan ranges, find the longest sequence
/// in a range, or serve the same queries over HTTP.
///
/// Examples:
///   collatz-stats analyze 27
///   collatz-stats batch 1 100 --format markdown --output report.md
///   collatz-stats longest 1 1000000 --max-iterations 10000
///   collatz-stats serve --port 8080
///   collatz-stats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .collatz.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (text, json, markdown)
    #[arg(long, default_value = "text", value_name = "FORMAT", global = true)]
    pub format: OutputFormat,

    /// Write the result to a file instead of stdout
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Give up on a trajectory after this many steps
    ///
    /// Unbounded unless set here, in the config file, or via
    /// COLLATZ_MAX_ITERATIONS.
    #[arg(long, value_name = "STEPS", env = "COLLATZ_MAX_ITERATIONS", global = true)]
    pub max_iterations: Option<u64>,

    /// Directory for persisted sequence records and run summaries
    #[arg(long, value_name = "DIR", global = true)]
    pub store: Option<PathBuf>,

    /// Disable the progress bar for range scans
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Generate a default .collatz.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Analyze the trajectory of a single number
    #[command(allow_negative_numbers = true)]
    Analyze {
        /// Starting number
        number: i64,
    },

    /// Analyze every number in an inclusive range
    #[command(allow_negative_numbers = true)]
    Batch {
        /// First number of the range
        start: i64,
        /// Last number of the range (inclusive)
        end: i64,
    },

    /// Find the number with the longest trajectory in an inclusive range
    #[command(allow_negative_numbers = true)]
    Longest {
        /// First number of the range
        start: i64,
        /// Last number of the range (inclusive)
        end: i64,
    },

    /// Serve the analysis API over HTTP
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST")]
        host: Option<String>,
        /// Port to listen on
        #[arg(long, env = "PORT")]
        port: Option<u16>,
        /// Environment name reported by /health
        #[arg(long, env = "ENVIRONMENT")]
        environment: Option<String>,
    },
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// JSON format
    Json,
    /// Markdown format
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            None => Err("No command given (try --help)".to_string()),
            Some(Command::Analyze { number }) => {
                if *number <= 0 {
                    return Err("Number must be positive".to_string());
                }
                Ok(())
            }
            Some(Command::Batch { start, end }) | Some(Command::Longest { start, end }) => {
                if *start <= 0 || *end <= 0 {
                    return Err("Numbers must be positive".to_string());
                }
                if start > end {
                    return Err(format!("Range start {} is greater than end {}", start, end));
                }
                Ok(())
            }
            Some(Command::Serve { port, .. }) => {
                if *port == Some(0) {
                    return Err("Port must be at least 1".to_string());
                }
                Ok(())
            }
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
