// taskloss-core/src/error.rs

use crate::types::DType;
use thiserror::Error;

/// Custom error type for the taskloss workspace.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum TaskLossError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Rank mismatch: expected rank {expected}, got rank {actual} during operation {operation}")]
    RankMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Data type mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DataTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Ragged layout mismatch during operation {operation}: row splits {left:?} vs {right:?}")]
    RaggedLayoutMismatch {
        left: Vec<usize>,
        right: Vec<usize>,
        operation: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
