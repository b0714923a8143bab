//! Single-trajectory generation and statistics.
//!
//! The engine walks the `3n + 1` map from a starting number down to 1.
//! Lengths count every element of the trajectory, the starting number and
//! the terminal 1 included, so `length(1) == 1` and `length(27) == 112`.

use crate::collatz::error::{CollatzError, Result};
use crate::models::SequenceAnalysis;
use std::ops::ControlFlow;

/// Computes Collatz trajectories and the statistics derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceEngine {
    /// Maximum number of transitions before giving up (None = unbounded).
    max_iterations: Option<u64>,
}

impl SequenceEngine {
    /// Create an engine with no iteration cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that fails once a trajectory needs more than
    /// `max_iterations` transitions to reach 1.
    pub fn with_max_iterations(max_iterations: Option<u64>) -> Self {
        Self { max_iterations }
    }

    /// The configured iteration cap.
    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }

    /// Generate the full trajectory of `n`, from `n` down to 1.
    pub fn generate(&self, n: i64) -> Result<Vec<u64>> {
        let start = validate(n)?;
        let mut sequence = Vec::new();
        self.walk(start, |_, value| {
            sequence.push(value);
            ControlFlow::Continue(())
        })?;
        Ok(sequence)
    }

    /// Generate the trajectory of `n` and compute every statistic over it.
    pub fn analyze(&self, n: i64) -> Result<SequenceAnalysis> {
        let starting_number = validate(n)?;
        let sequence = self.generate(n)?;

        let mut max_value = starting_number;
        let mut steps_to_max = 0;
        let mut even_count = 0;

        for (index, &value) in sequence.iter().enumerate() {
            // Strict comparison keeps the first occurrence of the peak.
            if value > max_value {
                max_value = value;
                steps_to_max = index;
            }
            if value % 2 == 0 {
                even_count += 1;
            }
        }

        let length = sequence.len();

        Ok(SequenceAnalysis {
            starting_number,
            length,
            max_value,
            steps_to_max,
            even_count,
            odd_count: length - even_count,
            is_power_of_two: starting_number.is_power_of_two(),
            growth_factor: max_value as f64 / starting_number as f64,
            sequence,
        })
    }

    /// Number of elements in the trajectory of `n`, without storing it.
    pub fn sequence_length(&self, n: i64) -> Result<usize> {
        let start = validate(n)?;
        let mut length = 0;
        self.walk(start, |_, _| {
            length += 1;
            ControlFlow::Continue(())
        })?;
        Ok(length)
    }

    /// Highest value reached by the trajectory of `n`.
    pub fn max_value(&self, n: i64) -> Result<u64> {
        let start = validate(n)?;
        let mut max_value = start;
        self.walk(start, |_, value| {
            max_value = max_value.max(value);
            ControlFlow::Continue(())
        })?;
        Ok(max_value)
    }

    /// Index of the first occurrence of the peak value.
    pub fn steps_to_max(&self, n: i64) -> Result<usize> {
        let start = validate(n)?;
        let mut max_value = start;
        let mut steps_to_max = 0;
        self.walk(start, |index, value| {
            if value > max_value {
                max_value = value;
                steps_to_max = index;
            }
            ControlFlow::Continue(())
        })?;
        Ok(steps_to_max)
    }

    /// Transitions needed to first drop below the starting number.
    ///
    /// The trajectory of 1 never drops below 1, so its stopping time is 0.
    pub fn stopping_time(&self, n: i64) -> Result<usize> {
        let start = validate(n)?;
        let mut stopping_time = 0;
        self.walk(start, |index, value| {
            if value < start {
                stopping_time = index;
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        Ok(stopping_time)
    }

    /// Visit every element of the trajectory in order, including the final 1.
    ///
    /// `visit` receives the zero-based index and the value; returning
    /// `Break` stops the walk early.
    fn walk<F>(&self, start: u64, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, u64) -> ControlFlow<()>,
    {
        let mut current = start;
        let mut index = 0usize;

        loop {
            if visit(index, current).is_break() || current == 1 {
                return Ok(());
            }

            if let Some(limit) = self.max_iterations {
                if index as u64 >= limit {
                    return Err(CollatzError::IterationLimitExceeded { start, limit });
                }
            }

            current = next_value(start, current)?;
            index += 1;
        }
    }
}

/// Check that `n` is a usable starting number.
fn validate(n: i64) -> Result<u64> {
    if n <= 0 {
        return Err(CollatzError::InvalidInput(n));
    }
    Ok(n as u64)
}

/// One application of the Collatz map.
fn next_value(start: u64, value: u64) -> Result<u64> {
    if value % 2 == 0 {
        Ok(value / 2)
    } else {
        value
            .checked_mul(3)
            .and_then(|v| v.checked_add(1))
            .ok_or(CollatzError::Overflow { start, value })
    }
}

/// Whether `n` is an exact power of two. Non-positive numbers never are.
pub fn is_power_of_two(n: i64) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Generate a trajectory with an unbounded engine.
pub fn generate_sequence(n: i64) -> Result<Vec<u64>> {
    SequenceEngine::new().generate(n)
}

/// Analyze a trajectory with an unbounded engine.
pub fn analyze_sequence(n: i64) -> Result<SequenceAnalysis> {
    SequenceEngine::new().analyze(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_sequences() {
        assert_eq!(generate_sequence(1).unwrap(), vec![1]);
        assert_eq!(generate_sequence(2).unwrap(), vec![2, 1]);
        assert_eq!(generate_sequence(3).unwrap(), vec![3, 10, 5, 16, 8, 4, 2, 1]);
        assert_eq!(generate_sequence(4).unwrap(), vec![4, 2, 1]);
    }

    #[test]
    fn test_analyze_one() {
        let analysis = analyze_sequence(1).unwrap();
        assert_eq!(analysis.length, 1);
        assert_eq!(analysis.max_value, 1);
        assert_eq!(analysis.steps_to_max, 0);
        assert_eq!(analysis.odd_count, 1);
        assert_eq!(analysis.even_count, 0);
        assert!(analysis.is_power_of_two);
    }

    #[test]
    fn test_analyze_three() {
        let analysis = analyze_sequence(3).unwrap();
        assert_eq!(analysis.starting_number, 3);
        assert_eq!(analysis.length, 8);
        assert_eq!(analysis.max_value, 16);
        assert_eq!(analysis.steps_to_max, 3);
        assert_eq!(analysis.even_count, 5);
        assert_eq!(analysis.odd_count, 3);
        assert!(!analysis.is_power_of_two);
        assert!((analysis.growth_factor - 16.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_twenty_seven() {
        let analysis = analyze_sequence(27).unwrap();
        assert_eq!(analysis.length, 112);
        assert_eq!(analysis.max_value, 9232);
        assert_eq!(analysis.sequence[analysis.steps_to_max], 9232);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(analyze_sequence(0).unwrap_err(), CollatzError::InvalidInput(0));
        assert_eq!(analyze_sequence(-5).unwrap_err(), CollatzError::InvalidInput(-5));
        assert_eq!(generate_sequence(-1).unwrap_err(), CollatzError::InvalidInput(-1));
    }

    #[test]
    fn test_shape_and_transition_law() {
        for n in 1..=500i64 {
            let sequence = generate_sequence(n).unwrap();
            assert_eq!(sequence.first(), Some(&(n as u64)));
            assert_eq!(sequence.last(), Some(&1));

            for pair in sequence.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if a % 2 == 0 {
                    assert_eq!(b, a / 2, "bad even step in trajectory of {}", n);
                } else {
                    assert_eq!(b, 3 * a + 1, "bad odd step in trajectory of {}", n);
                }
            }
        }
    }

    #[test]
    fn test_analysis_invariants() {
        let engine = SequenceEngine::new();
        for n in 1..=500i64 {
            let analysis = engine.analyze(n).unwrap();
            assert_eq!(analysis.length, analysis.sequence.len());
            assert!(analysis.max_value >= n as u64);
            assert_eq!(analysis.even_count + analysis.odd_count, analysis.length);
            assert_eq!(analysis.length, engine.sequence_length(n).unwrap());
            assert_eq!(analysis.max_value, engine.max_value(n).unwrap());
            assert_eq!(analysis.steps_to_max, engine.steps_to_max(n).unwrap());
        }
    }

    #[test]
    fn test_power_of_two_trajectories() {
        for k in 0..20u32 {
            let n = 1i64 << k;
            let analysis = analyze_sequence(n).unwrap();
            assert!(analysis.is_power_of_two);
            assert_eq!(analysis.length, k as usize + 1);
            for pair in analysis.sequence.windows(2) {
                assert_eq!(pair[1] * 2, pair[0]);
            }
        }
    }

    #[test]
    fn test_is_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(1024));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(-4));
        assert!(!is_power_of_two(6));
    }

    #[test]
    fn test_stopping_time() {
        let engine = SequenceEngine::new();
        assert_eq!(engine.stopping_time(1).unwrap(), 0);
        assert_eq!(engine.stopping_time(2).unwrap(), 1);
        assert_eq!(engine.stopping_time(3).unwrap(), 6);
        assert_eq!(engine.stopping_time(27).unwrap(), 96);
        assert!(engine.stopping_time(0).is_err());
    }

    #[test]
    fn test_iteration_limit() {
        let engine = SequenceEngine::with_max_iterations(Some(111));
        assert_eq!(engine.analyze(27).unwrap().length, 112);

        let engine = SequenceEngine::with_max_iterations(Some(110));
        assert_eq!(
            engine.analyze(27).unwrap_err(),
            CollatzError::IterationLimitExceeded { start: 27, limit: 110 }
        );

        let engine = SequenceEngine::with_max_iterations(Some(0));
        assert_eq!(engine.generate(1).unwrap(), vec![1]);
        assert!(engine.generate(2).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let start = i64::MAX as u64;
        assert_eq!(
            analyze_sequence(i64::MAX).unwrap_err(),
            CollatzError::Overflow { start, value: start }
        );
    }
}
