// taskloss-core/src/buffer.rs

use std::sync::Arc;

use crate::error::TaskLossError;
use crate::types::DType;

/// Typed storage for tensor data.
///
/// The vectors are wrapped in `Arc` so that views (e.g. transposes) can
/// share a single allocation with the tensors they were derived from.
#[derive(Debug, Clone)]
pub enum Buffer {
    /// Buffer holding f32 data.
    F32(Arc<Vec<f32>>),
    /// Buffer holding f64 data.
    F64(Arc<Vec<f64>>),
    /// Buffer holding boolean data (masks).
    Bool(Arc<Vec<bool>>),
}

impl Buffer {
    /// Returns the data type stored in this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
            Buffer::Bool(_) => DType::Bool,
        }
    }

    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(data) => data.len(),
            Buffer::F64(data) => data.len(),
            Buffer::Bool(data) => data.len(),
        }
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f32>>`.
    ///
    /// Returns an error if the buffer holds another element type.
    pub fn try_get_f32(&self) -> Result<&Arc<Vec<f32>>, TaskLossError> {
        match self {
            Buffer::F32(data) => Ok(data),
            other => Err(TaskLossError::DataTypeMismatch {
                expected: DType::F32,
                actual: other.dtype(),
                operation: "try_get_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<f64>>`.
    pub fn try_get_f64(&self) -> Result<&Arc<Vec<f64>>, TaskLossError> {
        match self {
            Buffer::F64(data) => Ok(data),
            other => Err(TaskLossError::DataTypeMismatch {
                expected: DType::F64,
                actual: other.dtype(),
                operation: "try_get_f64".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying `Arc<Vec<bool>>`.
    pub fn try_get_bool(&self) -> Result<&Arc<Vec<bool>>, TaskLossError> {
        match self {
            Buffer::Bool(data) => Ok(data),
            other => Err(TaskLossError::DataTypeMismatch {
                expected: DType::Bool,
                actual: other.dtype(),
                operation: "try_get_bool".to_string(),
            }),
        }
    }
}
