//! Collatz sequence engine and range scanning.

pub mod engine;
pub mod error;
pub mod range;

pub use engine::{analyze_sequence, generate_sequence, is_power_of_two, SequenceEngine};
pub use error::CollatzError;
pub use range::{RangeScanner, ScanObserver, SilentObserver, TracingObserver};
