// taskloss-core/src/ragged/reduction.rs

use num_traits::{Float, FromPrimitive};

use crate::error::TaskLossError;
use crate::ragged::{RaggedTensor, RaggedValues};
use crate::tensor::Tensor;

/// Reduces each row of a ragged tensor to its arithmetic mean.
///
/// Returns a dense tensor of shape `(num_rows,)` in the input dtype. An
/// empty row reduces to NaN (the IEEE 0/0 result), the same convention a
/// dense mean over an empty axis follows.
pub fn mean_rows_op(input: &RaggedTensor) -> Result<Tensor, TaskLossError> {
    let rows = input.num_rows();
    match input.values() {
        RaggedValues::F32(values) => {
            let data = mean_rows(values, input.row_splits())?;
            Tensor::new(data, vec![rows])
        }
        RaggedValues::F64(values) => {
            let data = mean_rows(values, input.row_splits())?;
            Tensor::new_f64(data, vec![rows])
        }
    }
}

fn mean_rows<T>(values: &[T], row_splits: &[usize]) -> Result<Vec<T>, TaskLossError>
where
    T: Float + FromPrimitive + std::iter::Sum,
{
    let mut out = Vec::with_capacity(row_splits.len() - 1);
    for window in row_splits.windows(2) {
        let row = &values[window[0]..window[1]];
        let count = T::from_usize(row.len()).ok_or_else(|| {
            TaskLossError::InternalError(
                "failed to convert row length to the element type".to_string(),
            )
        })?;
        let sum: T = row.iter().copied().sum();
        out.push(sum / count);
    }
    Ok(out)
}
