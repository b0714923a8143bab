//! collatz-stats - Collatz sequence statistics
//!
//! Generates Collatz (3n + 1) trajectories, derives per-sequence statistics,
//! scans inclusive ranges and serves the same queries over HTTP.
//!
//! ```no_run
//! use collatz_stats::collatz::{RangeScanner, SequenceEngine, SilentObserver};
//!
//! let analysis = SequenceEngine::new().analyze(27)?;
//! assert_eq!(analysis.length, 112);
//!
//! let scanner = RangeScanner::new(SequenceEngine::new(), &SilentObserver);
//! let longest = scanner.find_longest(1, 10)?;
//! assert_eq!(longest.map(|a| a.starting_number), Some(9));
//! # Ok::<(), collatz_stats::collatz::CollatzError>(())
//! ```

pub mod cli;
pub mod collatz;
pub mod config;
pub mod models;
pub mod progress;
pub mod report;
pub mod server;
pub mod store;
