// taskloss-metrics/src/lib.rs

//! Masked multi-task loss computation.
//!
//! The entry point is [`LossComputation`]: it ingests a batch of
//! predictions, expected outputs and a validity mask (all shaped
//! `(samples, tasks)`), derives per-task masked error sequences once, and
//! serves memoized per-task loss vectors and error-percentile statistics
//! from them.

pub mod loss_computation;
pub mod options;
pub mod ranking;

pub use loss_computation::LossComputation;
pub use options::{ErrorNormalization, LossType};
