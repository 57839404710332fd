// taskloss-metrics/src/ranking.rs

use taskloss_core::num_traits::Float;
use taskloss_core::{DType, RaggedTensor, TaskLossError, Tensor};

/// Listwise softmax ranking loss for a single ranking list.
///
/// `relevances` are the expected outputs acting as relevance labels and
/// `scores` are the model outputs. The loss is the cross-entropy between the
/// relevance distribution (labels normalized by their sum) and the softmax
/// of the scores:
///
/// ```text
/// L = -sum_i (y_i / sum_j y_j) * ln softmax(s)_i
/// ```
///
/// The softmax is evaluated through a max-subtracted log-sum-exp so large
/// scores do not overflow. An empty list yields NaN, consistent with the
/// empty-mean convention of the other losses.
pub fn listwise_softmax_loss<T>(relevances: &[T], scores: &[T]) -> T
where
    T: Float + std::iter::Sum,
{
    debug_assert_eq!(relevances.len(), scores.len());
    if relevances.is_empty() {
        return T::nan();
    }

    let max = scores.iter().copied().fold(T::neg_infinity(), T::max);
    let log_sum_exp = scores.iter().map(|&s| (s - max).exp()).sum::<T>().ln() + max;
    let relevance_sum: T = relevances.iter().copied().sum();

    let mut loss = T::zero();
    for (&relevance, &score) in relevances.iter().zip(scores.iter()) {
        let log_softmax = score - log_sum_exp;
        loss = loss - (relevance / relevance_sum) * log_softmax;
    }
    loss
}

/// Computes the listwise softmax loss independently for each row pair.
///
/// Row `t` of `relevances` and `scores` forms one ranking list; the result
/// is a dense tensor of shape `(num_rows,)` with one scalar loss per row.
/// Both inputs must share their layout and dtype.
pub fn ranking_softmax_loss_op(
    relevances: &RaggedTensor,
    scores: &RaggedTensor,
) -> Result<Tensor, TaskLossError> {
    if relevances.row_splits() != scores.row_splits() {
        return Err(TaskLossError::RaggedLayoutMismatch {
            left: relevances.row_splits().to_vec(),
            right: scores.row_splits().to_vec(),
            operation: "ranking_softmax_loss_op".to_string(),
        });
    }

    let rows = relevances.num_rows();
    match relevances.dtype() {
        DType::F32 => {
            let mut out = Vec::with_capacity(rows);
            for row in 0..rows {
                out.push(listwise_softmax_loss(
                    relevances.try_row_f32(row)?,
                    scores.try_row_f32(row)?,
                ));
            }
            Tensor::new(out, vec![rows])
        }
        _ => {
            let mut out = Vec::with_capacity(rows);
            for row in 0..rows {
                out.push(listwise_softmax_loss(
                    relevances.try_row_f64(row)?,
                    scores.try_row_f64(row)?,
                ));
            }
            Tensor::new_f64(out, vec![rows])
        }
    }
}
