//! Data models for sequence statistics.
//!
//! This module contains the value objects produced by the engine and the
//! record shapes handed to reports and the persistence store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Statistics about a single Collatz trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    /// The number the trajectory starts from.
    pub starting_number: u64,
    /// Every value visited, from the starting number down to 1.
    pub sequence: Vec<u64>,
    /// Number of elements in `sequence`.
    pub length: usize,
    /// Highest value reached.
    pub max_value: u64,
    /// Index of the first occurrence of `max_value`.
    pub steps_to_max: usize,
    /// Number of even elements.
    pub even_count: usize,
    /// Number of odd elements.
    pub odd_count: usize,
    /// Whether the starting number is an exact power of two.
    pub is_power_of_two: bool,
    /// `max_value / starting_number`.
    pub growth_factor: f64,
}

impl SequenceAnalysis {
    /// Number of transitions from the starting number to 1.
    pub fn total_steps(&self) -> usize {
        self.length.saturating_sub(1)
    }

    /// Transitions until the trajectory first drops below its starting number.
    pub fn stopping_time(&self) -> usize {
        self.sequence
            .iter()
            .position(|&value| value < self.starting_number)
            .unwrap_or(0)
    }
}

/// Per-sequence summary row, keyed by `starting_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub starting_number: u64,
    pub sequence_length: usize,
    pub max_value: u64,
    pub total_steps: usize,
    pub stopping_time: usize,
}

impl From<&SequenceAnalysis> for SequenceRecord {
    fn from(analysis: &SequenceAnalysis) -> Self {
        Self {
            starting_number: analysis.starting_number,
            sequence_length: analysis.length,
            max_value: analysis.max_value,
            total_steps: analysis.total_steps(),
            stopping_time: analysis.stopping_time(),
        }
    }
}

/// Aggregate statistics over a set of analyses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSummary {
    /// Number of analyses summarized.
    pub total_sequences: usize,
    /// Mean trajectory length.
    pub avg_sequence_length: f64,
    /// Longest trajectory length.
    pub max_sequence_length: usize,
    /// Shortest trajectory length.
    pub min_sequence_length: usize,
    /// Mean peak value.
    pub avg_max_value: f64,
    /// Starting number of the longest trajectory (smallest on ties).
    pub longest_starting_number: Option<u64>,
    /// Starting number whose trajectory climbs highest (smallest on ties).
    pub highest_peak_starting_number: Option<u64>,
    /// Peak value reached by that trajectory.
    pub highest_peak: Option<u64>,
}

impl RangeSummary {
    /// Creates a summary from analyses in ascending starting-number order.
    pub fn from_analyses(analyses: &[SequenceAnalysis]) -> Self {
        let mut summary = Self::default();
        if analyses.is_empty() {
            return summary;
        }

        summary.total_sequences = analyses.len();
        summary.min_sequence_length = usize::MAX;

        let mut length_total = 0f64;
        let mut peak_total = 0f64;

        for analysis in analyses {
            length_total += analysis.length as f64;
            peak_total += analysis.max_value as f64;

            if analysis.length > summary.max_sequence_length {
                summary.max_sequence_length = analysis.length;
                summary.longest_starting_number = Some(analysis.starting_number);
            }
            summary.min_sequence_length = summary.min_sequence_length.min(analysis.length);

            if summary.highest_peak.map_or(true, |peak| analysis.max_value > peak) {
                summary.highest_peak = Some(analysis.max_value);
                summary.highest_peak_starting_number = Some(analysis.starting_number);
            }
        }

        summary.avg_sequence_length = length_total / analyses.len() as f64;
        summary.avg_max_value = peak_total / analyses.len() as f64;

        summary
    }
}

/// Summary of one analysis run, as stored alongside the per-sequence rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRunSummary {
    /// Identifier assigned by the store (0 until stored).
    #[serde(default)]
    pub id: u64,
    /// Kind of run, e.g. `batch` or `longest`.
    pub analysis_type: String,
    pub range_start: i64,
    pub range_end: i64,
    pub total_sequences: usize,
    pub avg_sequence_length: f64,
    pub max_sequence_length: usize,
    pub min_sequence_length: usize,
    pub avg_max_value: f64,
    /// Free-form extra information about the run.
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRunSummary {
    /// Build a run summary from range bounds and aggregated statistics.
    pub fn new(
        analysis_type: &str,
        range_start: i64,
        range_end: i64,
        summary: &RangeSummary,
        metadata: Value,
    ) -> Self {
        Self {
            id: 0,
            analysis_type: analysis_type.to_string(),
            range_start,
            range_end,
            total_sequences: summary.total_sequences,
            avg_sequence_length: summary.avg_sequence_length,
            max_sequence_length: summary.max_sequence_length,
            min_sequence_length: summary.min_sequence_length,
            avg_max_value: summary.avg_max_value,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Metadata about a range report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// First number of the scanned range.
    pub range_start: i64,
    /// Last number of the scanned range.
    pub range_end: i64,
    /// Date and time of the run.
    pub analysis_date: DateTime<Utc>,
    /// Iteration cap the engine ran with.
    pub max_iterations: Option<u64>,
    /// Numbers skipped because they failed validation.
    pub skipped: usize,
    /// Duration of the scan in seconds.
    pub duration_seconds: f64,
}

/// A complete range report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeReport {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Aggregate statistics.
    pub summary: RangeSummary,
    /// Per-number analyses in ascending order.
    pub results: Vec<SequenceAnalysis>,
}

/// Result of a batch query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub start: i64,
    pub end: i64,
    pub count: usize,
    pub results: Vec<SequenceAnalysis>,
}

impl BatchResponse {
    pub fn new(start: i64, end: i64, results: Vec<SequenceAnalysis>) -> Self {
        Self {
            start,
            end,
            count: results.len(),
            results,
        }
    }
}

/// The longest analysis in a range, or an empty object when there is none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LongestSequence {
    Found(SequenceAnalysis),
    Empty {},
}

impl From<Option<SequenceAnalysis>> for LongestSequence {
    fn from(analysis: Option<SequenceAnalysis>) -> Self {
        match analysis {
            Some(analysis) => LongestSequence::Found(analysis),
            None => LongestSequence::Empty {},
        }
    }
}

/// Result of a longest-in-range query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongestResponse {
    /// The queried range as `start-end`.
    pub range: String,
    pub longest_sequence: LongestSequence,
}

impl LongestResponse {
    pub fn new(start: i64, end: i64, longest: Option<SequenceAnalysis>) -> Self {
        Self {
            range: format!("{}-{}", start, end),
            longest_sequence: longest.into(),
        }
    }
}
