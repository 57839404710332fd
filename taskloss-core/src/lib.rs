// taskloss-core/src/lib.rs

//! Tensor substrate for the `taskloss` workspace.
//!
//! Provides a small, eager, CPU-only tensor toolkit: a dense, dtype-tagged,
//! stride-aware [`Tensor`], a [`RaggedTensor`] for variable-length per-row
//! sequences, and the operations needed to turn masked `(sample, task)`
//! batches into per-task error statistics.

pub mod buffer;
pub mod error;
pub mod ops;
pub mod ragged;
pub mod tensor;
pub mod tensor_data;
pub mod types;

pub use error::TaskLossError;
pub use ragged::RaggedTensor;
pub use tensor::Tensor;
pub use types::DType;

// Re-export traits required by public functions/structs.
pub use num_traits;
