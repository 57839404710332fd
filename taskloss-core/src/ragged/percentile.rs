// taskloss-core/src/ragged/percentile.rs

use num_traits::{Float, FromPrimitive};

use crate::error::TaskLossError;
use crate::ragged::{RaggedTensor, RaggedValues};
use crate::tensor::Tensor;
use crate::types::DType;

/// Per-row percentile statistics with linear interpolation.
///
/// `ranks` are percentile ranks in `[0, 100]`. The result is a dense tensor
/// of shape `(ranks.len(), num_rows)`; entry `(i, r)` is the `ranks[i]`-th
/// percentile of row `r`, interpolated linearly between the two bracketing
/// order statistics of the sorted row. With no ranks the result is an empty
/// tensor of shape `(0,)` in the input dtype. An empty row yields NaN at
/// every rank.
///
/// # Errors
/// Returns `TaskLossError::InvalidArgument` if any rank exceeds 100.
pub fn percentile_rows_op(input: &RaggedTensor, ranks: &[u32]) -> Result<Tensor, TaskLossError> {
    for &rank in ranks {
        if rank > 100 {
            return Err(TaskLossError::InvalidArgument(format!(
                "percentile rank {} is outside [0, 100]",
                rank
            )));
        }
    }
    if ranks.is_empty() {
        return match input.dtype() {
            DType::F32 => Tensor::new(Vec::new(), vec![0]),
            _ => Tensor::new_f64(Vec::new(), vec![0]),
        };
    }

    let rows = input.num_rows();
    match input.values() {
        RaggedValues::F32(values) => {
            let data = percentile_rows(values, input.row_splits(), ranks)?;
            Tensor::new(data, vec![ranks.len(), rows])
        }
        RaggedValues::F64(values) => {
            let data = percentile_rows(values, input.row_splits(), ranks)?;
            Tensor::new_f64(data, vec![ranks.len(), rows])
        }
    }
}

fn percentile_rows<T>(
    values: &[T],
    row_splits: &[usize],
    ranks: &[u32],
) -> Result<Vec<T>, TaskLossError>
where
    T: Float + FromPrimitive,
{
    let rows = row_splits.len() - 1;
    // Rank-major layout: entry (i, r) lives at i * rows + r. Empty rows keep
    // the NaN fill.
    let mut out = vec![T::nan(); ranks.len() * rows];
    for (row_index, window) in row_splits.windows(2).enumerate() {
        let row = &values[window[0]..window[1]];
        if row.is_empty() {
            continue;
        }
        let mut sorted = row.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for (rank_index, &rank) in ranks.iter().enumerate() {
            out[rank_index * rows + row_index] = interpolate(&sorted, rank)?;
        }
    }
    Ok(out)
}

/// Linear-interpolation percentile of a non-empty sorted slice: the value at
/// position `rank / 100 * (len - 1)`, interpolated between the neighboring
/// order statistics when the position is fractional.
fn interpolate<T>(sorted: &[T], rank: u32) -> Result<T, TaskLossError>
where
    T: Float + FromPrimitive,
{
    let conversion_failed =
        || TaskLossError::InternalError("percentile position conversion failed".to_string());
    let last = T::from_usize(sorted.len() - 1).ok_or_else(conversion_failed)?;
    let hundred = T::from_u32(100).ok_or_else(conversion_failed)?;
    let rank = T::from_u32(rank).ok_or_else(conversion_failed)?;

    let position = rank / hundred * last;
    let lower = position.floor();
    let lower_index = lower.to_usize().ok_or_else(conversion_failed)?;
    let upper_index = position.ceil().to_usize().ok_or_else(conversion_failed)?;
    let fraction = position - lower;
    Ok(sorted[lower_index] + (sorted[upper_index] - sorted[lower_index]) * fraction)
}
