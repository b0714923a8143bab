//! Range scanning over many starting numbers.
//!
//! Scans walk an inclusive range in ascending order and analyze each number
//! independently. Numbers that fail validation are reported to the injected
//! observer and skipped; any other engine failure aborts the scan.

use crate::collatz::engine::SequenceEngine;
use crate::collatz::error::{CollatzError, Result};
use crate::models::SequenceAnalysis;
use tracing::{debug, warn};

/// Receives per-number events while a range is being scanned.
pub trait ScanObserver: Send + Sync {
    /// A number was analyzed successfully.
    fn on_analyzed(&self, _analysis: &SequenceAnalysis) {}

    /// A number failed validation and was skipped.
    fn on_skipped(&self, _number: i64, _error: &CollatzError) {}
}

/// Logs scan events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn on_analyzed(&self, analysis: &SequenceAnalysis) {
        debug!(
            "Analyzed sequence for {}: length={}",
            analysis.starting_number, analysis.length
        );
    }

    fn on_skipped(&self, number: i64, error: &CollatzError) {
        warn!("Skipping {}: {}", number, error);
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ScanObserver for SilentObserver {}

/// Applies a [`SequenceEngine`] across inclusive ranges.
pub struct RangeScanner<'a> {
    engine: SequenceEngine,
    observer: &'a dyn ScanObserver,
}

impl<'a> RangeScanner<'a> {
    /// Create a new range scanner.
    pub fn new(engine: SequenceEngine, observer: &'a dyn ScanObserver) -> Self {
        Self { engine, observer }
    }

    /// Analyze every number in `start..=end`, in ascending order.
    ///
    /// Invalid numbers are skipped, so the result may be shorter than the
    /// range. An empty range (`start > end`) yields an empty result.
    pub fn batch_analyze(&self, start: i64, end: i64) -> Result<Vec<SequenceAnalysis>> {
        let mut results = Vec::new();

        for number in start..=end {
            if let Some(analysis) = self.analyze_one(number)? {
                results.push(analysis);
            }
        }

        Ok(results)
    }

    /// Find the analysis with the greatest length in `start..=end`.
    ///
    /// Ties go to the smallest starting number. Returns `None` when no number
    /// in the range could be analyzed.
    pub fn find_longest(&self, start: i64, end: i64) -> Result<Option<SequenceAnalysis>> {
        let mut longest: Option<SequenceAnalysis> = None;

        for number in start..=end {
            let Some(analysis) = self.analyze_one(number)? else {
                continue;
            };

            let is_longer = longest
                .as_ref()
                .map_or(true, |current| analysis.length > current.length);
            if is_longer {
                longest = Some(analysis);
            }
        }

        Ok(longest)
    }

    /// Analyze one number, turning skippable failures into `None`.
    fn analyze_one(&self, number: i64) -> Result<Option<SequenceAnalysis>> {
        match self.engine.analyze(number) {
            Ok(analysis) => {
                self.observer.on_analyzed(&analysis);
                Ok(Some(analysis))
            }
            Err(e) if e.is_skippable() => {
                self.observer.on_skipped(number, &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
