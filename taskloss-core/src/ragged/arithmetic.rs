// taskloss-core/src/ragged/arithmetic.rs

//! Elementwise arithmetic over ragged tensors.
//!
//! Binary operations require both operands to share a layout (identical row
//! splits) and dtype; the result reuses that layout.

use crate::error::TaskLossError;
use crate::ragged::{RaggedTensor, RaggedValues};

fn check_layout(a: &RaggedTensor, b: &RaggedTensor, operation: &str) -> Result<(), TaskLossError> {
    if a.row_splits() != b.row_splits() {
        return Err(TaskLossError::RaggedLayoutMismatch {
            left: a.row_splits().to_vec(),
            right: b.row_splits().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn dtype_mismatch(a: &RaggedTensor, b: &RaggedTensor, operation: &str) -> TaskLossError {
    TaskLossError::DataTypeMismatch {
        expected: a.dtype(),
        actual: b.dtype(),
        operation: operation.to_string(),
    }
}

/// Elementwise sum of two ragged tensors sharing a layout.
pub fn add_op(a: &RaggedTensor, b: &RaggedTensor) -> Result<RaggedTensor, TaskLossError> {
    check_layout(a, b, "add_op")?;
    match (a.values(), b.values()) {
        (RaggedValues::F32(x), RaggedValues::F32(y)) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().zip(y.iter()).map(|(l, r)| l + r).collect()),
            a.row_splits().to_vec(),
        ),
        (RaggedValues::F64(x), RaggedValues::F64(y)) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().zip(y.iter()).map(|(l, r)| l + r).collect()),
            a.row_splits().to_vec(),
        ),
        _ => Err(dtype_mismatch(a, b, "add_op")),
    }
}

/// Elementwise difference of two ragged tensors sharing a layout.
pub fn sub_op(a: &RaggedTensor, b: &RaggedTensor) -> Result<RaggedTensor, TaskLossError> {
    check_layout(a, b, "sub_op")?;
    match (a.values(), b.values()) {
        (RaggedValues::F32(x), RaggedValues::F32(y)) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().zip(y.iter()).map(|(l, r)| l - r).collect()),
            a.row_splits().to_vec(),
        ),
        (RaggedValues::F64(x), RaggedValues::F64(y)) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().zip(y.iter()).map(|(l, r)| l - r).collect()),
            a.row_splits().to_vec(),
        ),
        _ => Err(dtype_mismatch(a, b, "sub_op")),
    }
}

/// Elementwise quotient of two ragged tensors sharing a layout.
///
/// Division is IEEE-754: a zero denominator produces an infinity or NaN,
/// it is not guarded against here.
pub fn div_op(a: &RaggedTensor, b: &RaggedTensor) -> Result<RaggedTensor, TaskLossError> {
    check_layout(a, b, "div_op")?;
    match (a.values(), b.values()) {
        (RaggedValues::F32(x), RaggedValues::F32(y)) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().zip(y.iter()).map(|(l, r)| l / r).collect()),
            a.row_splits().to_vec(),
        ),
        (RaggedValues::F64(x), RaggedValues::F64(y)) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().zip(y.iter()).map(|(l, r)| l / r).collect()),
            a.row_splits().to_vec(),
        ),
        _ => Err(dtype_mismatch(a, b, "div_op")),
    }
}

/// Elementwise absolute value.
pub fn abs_op(a: &RaggedTensor) -> Result<RaggedTensor, TaskLossError> {
    match a.values() {
        RaggedValues::F32(x) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().map(|v| v.abs()).collect()),
            a.row_splits().to_vec(),
        ),
        RaggedValues::F64(x) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().map(|v| v.abs()).collect()),
            a.row_splits().to_vec(),
        ),
    }
}

/// Elementwise square.
pub fn square_op(a: &RaggedTensor) -> Result<RaggedTensor, TaskLossError> {
    match a.values() {
        RaggedValues::F32(x) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().map(|v| v * v).collect()),
            a.row_splits().to_vec(),
        ),
        RaggedValues::F64(x) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().map(|v| v * v).collect()),
            a.row_splits().to_vec(),
        ),
    }
}

/// Multiplies every element by a scalar.
pub fn mul_scalar_op(a: &RaggedTensor, scalar: f64) -> Result<RaggedTensor, TaskLossError> {
    match a.values() {
        RaggedValues::F32(x) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().map(|v| v * scalar as f32).collect()),
            a.row_splits().to_vec(),
        ),
        RaggedValues::F64(x) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().map(|v| v * scalar).collect()),
            a.row_splits().to_vec(),
        ),
    }
}

/// Clamps every element from below by a scalar (elementwise maximum).
pub fn max_scalar_op(a: &RaggedTensor, scalar: f64) -> Result<RaggedTensor, TaskLossError> {
    match a.values() {
        RaggedValues::F32(x) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().map(|v| v.max(scalar as f32)).collect()),
            a.row_splits().to_vec(),
        ),
        RaggedValues::F64(x) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().map(|v| v.max(scalar)).collect()),
            a.row_splits().to_vec(),
        ),
    }
}

/// Clamps every element from above by a scalar (elementwise minimum).
pub fn min_scalar_op(a: &RaggedTensor, scalar: f64) -> Result<RaggedTensor, TaskLossError> {
    match a.values() {
        RaggedValues::F32(x) => RaggedTensor::from_parts(
            RaggedValues::F32(x.iter().map(|v| v.min(scalar as f32)).collect()),
            a.row_splits().to_vec(),
        ),
        RaggedValues::F64(x) => RaggedTensor::from_parts(
            RaggedValues::F64(x.iter().map(|v| v.min(scalar)).collect()),
            a.row_splits().to_vec(),
        ),
    }
}
