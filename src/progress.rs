//! Progress reporting for range scans on the command line.

use crate::collatz::{CollatzError, ScanObserver, TracingObserver};
use crate::models::SequenceAnalysis;
use indicatif::{ProgressBar, ProgressStyle};

/// Drives a progress bar from scan events and forwards them to `tracing`.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    /// Create a progress bar for `total` numbers.
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// A progress observer that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Numbers processed so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ScanObserver for ProgressObserver {
    fn on_analyzed(&self, analysis: &SequenceAnalysis) {
        self.bar.suspend(|| TracingObserver.on_analyzed(analysis));
        self.bar.inc(1);
    }

    fn on_skipped(&self, number: i64, error: &CollatzError) {
        self.bar.suspend(|| TracingObserver.on_skipped(number, error));
        self.bar.inc(1);
    }
}
