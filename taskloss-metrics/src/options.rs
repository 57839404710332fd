// taskloss-metrics/src/options.rs

use taskloss_core::TaskLossError;

/// The loss functions supported by
/// [`LossComputation`](crate::LossComputation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossType {
    /// Mean of the (normalized) squared errors.
    MeanSquaredError,
    /// Mean of the (normalized) absolute errors.
    MeanAbsoluteError,
    /// Huber loss with a fixed delta of 1.0.
    Huber,
    /// Listwise softmax ranking loss, one ranking list per task.
    RankingSoftmaxLoss,
}

impl LossType {
    /// Parses a loss type from its configuration name.
    pub fn from_str(s: &str) -> Result<Self, TaskLossError> {
        match s.to_lowercase().as_str() {
            "mean_squared_error" | "mse" => Ok(LossType::MeanSquaredError),
            "mean_absolute_error" | "mae" => Ok(LossType::MeanAbsoluteError),
            "huber" => Ok(LossType::Huber),
            "ranking_softmax_loss" => Ok(LossType::RankingSoftmaxLoss),
            _ => Err(TaskLossError::InvalidArgument(format!(
                "unknown loss type: {}",
                s
            ))),
        }
    }
}

/// Normalization applied to raw errors before a loss aggregates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorNormalization {
    /// Raw errors.
    None,
    /// Errors relative to the expected value (percentage errors).
    PercentageError,
    /// Errors divided by the expected value clamped to at least one.
    ExpectedValueGreaterThanOne,
}

impl ErrorNormalization {
    /// Parses a normalization from its configuration name.
    pub fn from_str(s: &str) -> Result<Self, TaskLossError> {
        match s.to_lowercase().as_str() {
            "none" => Ok(ErrorNormalization::None),
            "percentage_error" => Ok(ErrorNormalization::PercentageError),
            "expected_value_greater_than_one" => {
                Ok(ErrorNormalization::ExpectedValueGreaterThanOne)
            }
            _ => Err(TaskLossError::InvalidArgument(format!(
                "unknown error normalization: {}",
                s
            ))),
        }
    }
}
