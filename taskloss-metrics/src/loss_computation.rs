// taskloss-metrics/src/loss_computation.rs

use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;
use taskloss_core::ops::masking::ragged_boolean_mask_op;
use taskloss_core::ops::transpose::transpose_op;
use taskloss_core::ragged::arithmetic::{
    abs_op, add_op, div_op, max_scalar_op, min_scalar_op, mul_scalar_op, square_op, sub_op,
};
use taskloss_core::ragged::percentile::percentile_rows_op;
use taskloss_core::ragged::reduction::mean_rows_op;
use taskloss_core::{DType, RaggedTensor, TaskLossError, Tensor};

use crate::options::{ErrorNormalization, LossType};
use crate::ranking::ranking_softmax_loss_op;

/// Key used to memoize the loss tensors produced by a `LossComputation`.
type LossKey = (LossType, ErrorNormalization);

/// The delta parameter of the Huber loss.
const HUBER_DELTA: f64 = 1.0;

/// Maintains the masked, per-task error views of a batch of predictions and
/// the loss and percentile statistics derived from them.
///
/// Inputs are three tensors of shape `(N, T)`: model outputs, expected
/// outputs and a boolean validity mask over `N` samples and `T` tasks. At
/// construction the data is transposed task-first and masked into per-task
/// variable-length sequences, from which every error sequence and the
/// percentile statistics are derived eagerly. Loss vectors are built lazily
/// on first request and memoized per `(loss type, normalization)` pair.
///
/// The memoization cache lives in a `RefCell`, so a `LossComputation` is
/// intentionally not `Sync`; share it between threads by computing the
/// tensors you need first and passing those around instead.
pub struct LossComputation {
    num_tasks: usize,
    dtype: DType,
    percentile_ranks: Vec<u32>,
    output_values: RaggedTensor,
    expected_outputs: RaggedTensor,
    delta: RaggedTensor,
    squared_errors: RaggedTensor,
    absolute_errors: RaggedTensor,
    absolute_percentage_errors: RaggedTensor,
    squared_percentage_errors: RaggedTensor,
    absolute_error_percentiles: Tensor,
    absolute_percentage_error_percentiles: Tensor,
    /// Expected values clamped to at least one, the denominator of the
    /// `ExpectedValueGreaterThanOne` normalization.
    expected_outputs_or_one: RaggedTensor,
    loss_tensors: RefCell<HashMap<LossKey, Tensor>>,
}

impl LossComputation {
    /// Initializes the loss computation.
    ///
    /// # Arguments
    /// * `output_values`: The actual outputs of the model; shape `(N, T)`
    ///   where `N` is the number of samples and `T` the number of tasks.
    /// * `expected_outputs`: The expected outputs of the model; same shape.
    /// * `mask`: Marks the well-defined outputs; same shape, boolean. Only
    ///   outputs whose mask entry is true enter the losses.
    /// * `dtype`: The floating-point element type of the model outputs.
    /// * `percentile_ranks`: The percentile ranks used in the error
    ///   statistics; integers between 0 and 100.
    ///
    /// # Errors
    /// Fails with a validation error if `output_values` is not rank 2, if
    /// the three shapes differ, if the mask is not boolean, if `dtype` is
    /// not floating-point, if the outputs do not match `dtype`, or if a
    /// percentile rank is out of range. Construction either fully succeeds
    /// or leaves nothing behind.
    pub fn new(
        output_values: &Tensor,
        expected_outputs: &Tensor,
        mask: &Tensor,
        dtype: DType,
        percentile_ranks: &[u32],
    ) -> Result<Self, TaskLossError> {
        let output_shape = output_values.shape();
        if output_shape.len() != 2 {
            return Err(TaskLossError::RankMismatch {
                expected: 2,
                actual: output_shape.len(),
                operation: "LossComputation::new (output_values)".to_string(),
            });
        }
        if expected_outputs.shape() != output_shape {
            return Err(TaskLossError::ShapeMismatch {
                expected: output_shape,
                actual: expected_outputs.shape(),
                operation: "LossComputation::new (expected_outputs)".to_string(),
            });
        }
        if mask.shape() != output_shape {
            return Err(TaskLossError::ShapeMismatch {
                expected: output_shape,
                actual: mask.shape(),
                operation: "LossComputation::new (mask)".to_string(),
            });
        }
        if mask.dtype() != DType::Bool {
            return Err(TaskLossError::DataTypeMismatch {
                expected: DType::Bool,
                actual: mask.dtype(),
                operation: "LossComputation::new (mask)".to_string(),
            });
        }
        if !dtype.is_float() {
            return Err(TaskLossError::InvalidArgument(format!(
                "dtype must be a floating-point type, got {:?}",
                dtype
            )));
        }
        if output_values.dtype() != dtype {
            return Err(TaskLossError::DataTypeMismatch {
                expected: dtype,
                actual: output_values.dtype(),
                operation: "LossComputation::new (output_values)".to_string(),
            });
        }

        let num_tasks = output_shape[1];

        // The masking op rags the trailing axis, so the task axis has to be
        // moved in front before building the per-task sequences.
        let transposed_mask = transpose_op(mask, 0, 1)?;
        let output_values = ragged_boolean_mask_op(
            &transpose_op(output_values, 0, 1)?,
            &transposed_mask,
        )?;
        let expected_outputs = ragged_boolean_mask_op(
            &transpose_op(expected_outputs, 0, 1)?,
            &transposed_mask,
        )?;

        let delta = sub_op(&output_values, &expected_outputs)?;
        let squared_errors = square_op(&delta)?;
        let absolute_errors = abs_op(&delta)?;
        // No zero-guard on the denominator: expected outputs are assumed
        // non-zero whenever a percentage-error variant is requested.
        let absolute_percentage_errors = div_op(&absolute_errors, &expected_outputs)?;
        let squared_percentage_errors = square_op(&absolute_percentage_errors)?;

        let absolute_error_percentiles =
            percentile_rows_op(&absolute_errors, percentile_ranks)?;
        let absolute_percentage_error_percentiles =
            percentile_rows_op(&absolute_percentage_errors, percentile_ranks)?;

        let expected_outputs_or_one = max_scalar_op(&expected_outputs, 1.0)?;

        Ok(LossComputation {
            num_tasks,
            dtype,
            percentile_ranks: percentile_ranks.to_vec(),
            output_values,
            expected_outputs,
            delta,
            squared_errors,
            absolute_errors,
            absolute_percentage_errors,
            squared_percentage_errors,
            absolute_error_percentiles,
            absolute_percentage_error_percentiles,
            expected_outputs_or_one,
            loss_tensors: RefCell::new(HashMap::new()),
        })
    }

    /// Returns the number of tasks `T`.
    pub fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    /// Returns the element type of the model outputs.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the configured percentile ranks.
    pub fn percentile_ranks(&self) -> &[u32] {
        &self.percentile_ranks
    }

    /// Returns the per-task mean absolute error.
    pub fn mean_absolute_error(&self) -> Result<Tensor, TaskLossError> {
        self.loss_tensor(ErrorNormalization::None, LossType::MeanAbsoluteError)
    }

    /// Returns the per-task mean squared error.
    pub fn mean_squared_error(&self) -> Result<Tensor, TaskLossError> {
        self.loss_tensor(ErrorNormalization::None, LossType::MeanSquaredError)
    }

    /// Returns the per-task mean absolute percentage error.
    pub fn mean_absolute_percentage_error(&self) -> Result<Tensor, TaskLossError> {
        self.loss_tensor(
            ErrorNormalization::PercentageError,
            LossType::MeanAbsoluteError,
        )
    }

    /// Returns the per-task mean squared percentage error.
    pub fn mean_squared_percentage_error(&self) -> Result<Tensor, TaskLossError> {
        self.loss_tensor(
            ErrorNormalization::PercentageError,
            LossType::MeanSquaredError,
        )
    }

    /// Returns the percentiles of the absolute error.
    ///
    /// Shape `(num_ranks, T)`; an empty `(0,)` tensor when no percentile
    /// ranks were configured.
    pub fn absolute_error_percentiles(&self) -> Tensor {
        self.absolute_error_percentiles.clone()
    }

    /// Returns the percentiles of the absolute percentage error.
    pub fn absolute_percentage_error_percentiles(&self) -> Tensor {
        self.absolute_percentage_error_percentiles.clone()
    }

    /// Returns a loss tensor of the given type.
    ///
    /// # Arguments
    /// * `normalization`: Determines whether and how the errors feeding the
    ///   loss are normalized.
    /// * `loss_type`: The type of loss.
    ///
    /// # Returns
    /// A tensor of shape `(T,)` with one scalar loss per task. Results are
    /// memoized: repeated calls with the same arguments return a tensor
    /// sharing the storage of the first result, observable through
    /// [`Tensor::ptr_eq`].
    ///
    /// # Errors
    /// `TaskLossError::NotImplemented` when `Huber` or `RankingSoftmaxLoss`
    /// is combined with `ExpectedValueGreaterThanOne`; those losses are not
    /// parametrized over that normalization.
    pub fn loss_tensor(
        &self,
        normalization: ErrorNormalization,
        loss_type: LossType,
    ) -> Result<Tensor, TaskLossError> {
        if let Some(tensor) = self.loss_tensors.borrow().get(&(loss_type, normalization)) {
            return Ok(tensor.clone());
        }
        debug!(
            "building {:?}/{:?} loss tensor over {} tasks",
            loss_type, normalization, self.num_tasks
        );

        let tensor = match loss_type {
            LossType::MeanSquaredError => {
                mean_rows_op(&self.squared_errors_with_normalization(normalization)?)?
            }
            LossType::MeanAbsoluteError => {
                mean_rows_op(&self.absolute_errors_with_normalization(normalization)?)?
            }
            LossType::Huber => {
                if normalization == ErrorNormalization::ExpectedValueGreaterThanOne {
                    return Err(TaskLossError::NotImplemented(format!(
                        "Huber loss with normalization {:?}",
                        normalization
                    )));
                }
                let absolute_errors = self.absolute_errors_with_normalization(normalization)?;
                // Quadratic up to the delta, linear beyond it. The linear
                // part is zero wherever the error stays below the delta.
                let quadratic = min_scalar_op(&absolute_errors, HUBER_DELTA)?;
                let linear = sub_op(&absolute_errors, &quadratic)?;
                let elementwise = add_op(
                    &mul_scalar_op(&square_op(&quadratic)?, 0.5)?,
                    &mul_scalar_op(&linear, HUBER_DELTA)?,
                )?;
                mean_rows_op(&elementwise)?
            }
            LossType::RankingSoftmaxLoss => {
                if normalization == ErrorNormalization::ExpectedValueGreaterThanOne {
                    return Err(TaskLossError::NotImplemented(format!(
                        "ranking softmax loss with normalization {:?}",
                        normalization
                    )));
                }
                // The ranking loss consumes the raw masked sequences, not an
                // error sequence; each task forms a single ranking list.
                ranking_softmax_loss_op(&self.expected_outputs, &self.output_values)?
            }
        };

        self.loss_tensors
            .borrow_mut()
            .insert((loss_type, normalization), tensor.clone());
        Ok(tensor)
    }

    /// Selects the squared-error sequence for a normalization.
    fn squared_errors_with_normalization(
        &self,
        normalization: ErrorNormalization,
    ) -> Result<RaggedTensor, TaskLossError> {
        match normalization {
            ErrorNormalization::None => Ok(self.squared_errors.clone()),
            ErrorNormalization::PercentageError => Ok(self.squared_percentage_errors.clone()),
            ErrorNormalization::ExpectedValueGreaterThanOne => {
                square_op(&div_op(&self.delta, &self.expected_outputs_or_one)?)
            }
        }
    }

    /// Selects the absolute-error sequence for a normalization.
    fn absolute_errors_with_normalization(
        &self,
        normalization: ErrorNormalization,
    ) -> Result<RaggedTensor, TaskLossError> {
        match normalization {
            ErrorNormalization::None => Ok(self.absolute_errors.clone()),
            ErrorNormalization::PercentageError => Ok(self.absolute_percentage_errors.clone()),
            ErrorNormalization::ExpectedValueGreaterThanOne => {
                div_op(&self.absolute_errors, &self.expected_outputs_or_one)
            }
        }
    }
}

#[cfg(test)]
#[path = "loss_computation_test.rs"]
mod tests;
