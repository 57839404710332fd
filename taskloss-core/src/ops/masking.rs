// taskloss-core/src/ops/masking.rs

use crate::error::TaskLossError;
use crate::ragged::{RaggedTensor, RaggedValues};
use crate::tensor::Tensor;
use crate::types::DType;

/// Builds a ragged view of `input` by keeping only the entries where `mask`
/// is true.
///
/// Both tensors must be rank 2 with identical shapes, and `mask` must be
/// boolean. Row `r` of the result holds the selected elements of
/// `input[r, :]` in their original order; rows may end up with different
/// lengths. The ragged axis is always the trailing one, which is why callers
/// with a leading sample axis transpose first.
///
/// Works on views: elements are read through the tensors' strides.
pub fn ragged_boolean_mask_op(
    input: &Tensor,
    mask: &Tensor,
) -> Result<RaggedTensor, TaskLossError> {
    let input_guard = input.read_data();
    let mask_guard = mask.read_data();

    if input_guard.shape.len() != 2 {
        return Err(TaskLossError::RankMismatch {
            expected: 2,
            actual: input_guard.shape.len(),
            operation: "ragged_boolean_mask_op".to_string(),
        });
    }
    if mask_guard.dtype != DType::Bool {
        return Err(TaskLossError::DataTypeMismatch {
            expected: DType::Bool,
            actual: mask_guard.dtype,
            operation: "ragged_boolean_mask_op (mask)".to_string(),
        });
    }
    if input_guard.shape != mask_guard.shape {
        return Err(TaskLossError::ShapeMismatch {
            expected: input_guard.shape.clone(),
            actual: mask_guard.shape.clone(),
            operation: "ragged_boolean_mask_op".to_string(),
        });
    }

    let rows = input_guard.shape[0];
    let cols = input_guard.shape[1];
    let mask_data = mask_guard.buffer().try_get_bool()?;

    let mut row_splits = Vec::with_capacity(rows + 1);
    row_splits.push(0);

    match input_guard.dtype {
        DType::F32 => {
            let input_data = input_guard.buffer().try_get_f32()?;
            let mut values = Vec::new();
            for r in 0..rows {
                for c in 0..cols {
                    if mask_data[mask_guard.get_offset(&[r, c])] {
                        values.push(input_data[input_guard.get_offset(&[r, c])]);
                    }
                }
                row_splits.push(values.len());
            }
            RaggedTensor::from_parts(RaggedValues::F32(values), row_splits)
        }
        DType::F64 => {
            let input_data = input_guard.buffer().try_get_f64()?;
            let mut values = Vec::new();
            for r in 0..rows {
                for c in 0..cols {
                    if mask_data[mask_guard.get_offset(&[r, c])] {
                        values.push(input_data[input_guard.get_offset(&[r, c])]);
                    }
                }
                row_splits.push(values.len());
            }
            RaggedTensor::from_parts(RaggedValues::F64(values), row_splits)
        }
        DType::Bool => Err(TaskLossError::DataTypeMismatch {
            expected: DType::F64,
            actual: DType::Bool,
            operation: "ragged_boolean_mask_op (input)".to_string(),
        }),
    }
}
