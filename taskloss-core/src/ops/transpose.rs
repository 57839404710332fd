// taskloss-core/src/ops/transpose.rs

use std::sync::{Arc, RwLock};

use crate::error::TaskLossError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Performs the transpose operation between two dimensions, creating a view.
///
/// No data is copied: the result shares the input's buffer with the affected
/// shape and stride entries swapped.
///
/// # Arguments
/// * `tensor`: The input tensor.
/// * `dim1`: The first dimension to transpose.
/// * `dim2`: The second dimension to transpose.
pub fn transpose_op(tensor: &Tensor, dim1: usize, dim2: usize) -> Result<Tensor, TaskLossError> {
    let guard = tensor.read_data();
    let rank = guard.shape.len();

    if dim1 >= rank || dim2 >= rank {
        return Err(TaskLossError::RankMismatch {
            expected: rank,
            actual: std::cmp::max(dim1, dim2) + 1,
            operation: "transpose_op".to_string(),
        });
    }

    let mut new_shape = guard.shape.clone();
    let mut new_strides = guard.strides.clone();
    new_shape.swap(dim1, dim2);
    new_strides.swap(dim1, dim2);

    let new_td = TensorData::new_view(
        Arc::clone(guard.buffer()),
        guard.offset,
        new_shape,
        new_strides,
    );
    drop(guard);

    Ok(Tensor {
        data: Arc::new(RwLock::new(new_td)),
    })
}
