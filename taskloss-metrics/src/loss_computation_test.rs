// taskloss-metrics/src/loss_computation_test.rs

use super::*;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Builds a single-task computation over fully masked f64 data.
fn single_task(
    predictions: Vec<f64>,
    expected: Vec<f64>,
    mask: Vec<bool>,
) -> LossComputation {
    let n = predictions.len();
    let predictions = Tensor::new_f64(predictions, vec![n, 1]).unwrap();
    let expected = Tensor::new_f64(expected, vec![n, 1]).unwrap();
    let mask = Tensor::new_bool(mask, vec![n, 1]).unwrap();
    LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]).unwrap()
}

#[test]
fn test_rejects_non_2d_outputs() {
    let predictions = Tensor::new_f64(vec![1.0, 2.0], vec![2]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 2.0], vec![2]).unwrap();
    let mask = Tensor::new_bool(vec![true, true], vec![2]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]);
    assert!(matches!(result, Err(TaskLossError::RankMismatch { .. })));
}

#[test]
fn test_rejects_expected_shape_mismatch() {
    let predictions = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 2.0], vec![1, 2]).unwrap();
    let mask = Tensor::new_bool(vec![true, true], vec![2, 1]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]);
    assert!(matches!(result, Err(TaskLossError::ShapeMismatch { .. })));
}

#[test]
fn test_rejects_mask_shape_mismatch() {
    let predictions = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let mask = Tensor::new_bool(vec![true, true, false, false], vec![2, 2]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]);
    assert!(matches!(result, Err(TaskLossError::ShapeMismatch { .. })));
}

#[test]
fn test_rejects_non_bool_mask() {
    let predictions = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let mask = Tensor::new_f64(vec![1.0, 0.0], vec![2, 1]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]);
    assert!(matches!(result, Err(TaskLossError::DataTypeMismatch { .. })));
}

#[test]
fn test_rejects_output_dtype_mismatch() {
    let predictions = Tensor::new(vec![1.0f32, 2.0], vec![2, 1]).unwrap();
    let expected = Tensor::new(vec![1.0f32, 2.0], vec![2, 1]).unwrap();
    let mask = Tensor::new_bool(vec![true, true], vec![2, 1]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]);
    assert!(matches!(result, Err(TaskLossError::DataTypeMismatch { .. })));
}

#[test]
fn test_rejects_non_float_dtype() {
    let predictions = Tensor::new_bool(vec![true, false], vec![2, 1]).unwrap();
    let expected = Tensor::new_bool(vec![true, false], vec![2, 1]).unwrap();
    let mask = Tensor::new_bool(vec![true, true], vec![2, 1]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::Bool, &[]);
    assert!(matches!(result, Err(TaskLossError::InvalidArgument(_))));
}

#[test]
fn test_rejects_out_of_range_percentile_rank() {
    let predictions = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let mask = Tensor::new_bool(vec![true, true], vec![2, 1]).unwrap();
    let result = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[50, 101]);
    assert!(matches!(result, Err(TaskLossError::InvalidArgument(_))));
}

#[test]
fn test_mse_and_mae_single_task() {
    let loss = single_task(
        vec![1.0, 2.0, 3.0, 4.0],
        vec![1.0, 2.0, 3.0, 5.0],
        vec![true, true, true, true],
    );
    assert_eq!(loss.num_tasks(), 1);
    let mse = loss.mean_squared_error().unwrap();
    let mae = loss.mean_absolute_error().unwrap();
    assert_eq!(mse.shape(), vec![1]);
    assert_relative_eq!(mse.get_f64_data().unwrap()[0], 0.25);
    assert_relative_eq!(mae.get_f64_data().unwrap()[0], 0.25);
}

#[test]
fn test_mask_restricts_the_error_sequence() {
    // Only samples 0 and 2 survive the mask; both have zero error.
    let loss = single_task(
        vec![1.0, 2.0, 3.0, 4.0],
        vec![1.0, 2.0, 3.0, 5.0],
        vec![true, false, true, false],
    );
    assert_relative_eq!(
        loss.mean_absolute_error().unwrap().get_f64_data().unwrap()[0],
        0.0
    );
    assert_relative_eq!(
        loss.mean_squared_error().unwrap().get_f64_data().unwrap()[0],
        0.0
    );
}

#[test]
fn test_multi_task_masks_are_independent() {
    let predictions =
        Tensor::new_f64(vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0], vec![3, 2]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 12.0, 4.0, 20.0, 3.0, 31.0], vec![3, 2]).unwrap();
    let mask =
        Tensor::new_bool(vec![true, true, true, false, true, true], vec![3, 2]).unwrap();
    let loss = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]).unwrap();

    let mae = loss.mean_absolute_error().unwrap().get_f64_data().unwrap();
    assert_relative_eq!(mae[0], 2.0 / 3.0);
    assert_relative_eq!(mae[1], 1.5);

    let mse = loss.mean_squared_error().unwrap().get_f64_data().unwrap();
    assert_relative_eq!(mse[0], 4.0 / 3.0);
    assert_relative_eq!(mse[1], 2.5);
}

#[test]
fn test_all_false_mask_row_yields_nan() {
    let predictions = Tensor::new_f64(vec![1.0, 10.0, 2.0, 20.0], vec![2, 2]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 12.0, 2.0, 21.0], vec![2, 2]).unwrap();
    let mask = Tensor::new_bool(vec![true, false, true, false], vec![2, 2]).unwrap();
    let loss = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[]).unwrap();

    let mae = loss.mean_absolute_error().unwrap().get_f64_data().unwrap();
    assert_relative_eq!(mae[0], 0.0);
    assert!(mae[1].is_nan());
}

#[test]
fn test_percentage_error_losses() {
    let loss = single_task(
        vec![110.0, 90.0, 100.0, 150.0],
        vec![100.0, 100.0, 100.0, 200.0],
        vec![true, true, true, true],
    );
    let mape = loss.mean_absolute_percentage_error().unwrap();
    assert_relative_eq!(mape.get_f64_data().unwrap()[0], 0.1125);
    let mspe = loss.mean_squared_percentage_error().unwrap();
    assert_relative_eq!(mspe.get_f64_data().unwrap()[0], 0.020625);
}

#[test]
fn test_expected_value_greater_than_one_normalization() {
    // Expected values below one divide by one instead.
    let loss = single_task(vec![1.5, 5.0], vec![0.5, 2.0], vec![true, true]);
    let mae = loss
        .loss_tensor(
            ErrorNormalization::ExpectedValueGreaterThanOne,
            LossType::MeanAbsoluteError,
        )
        .unwrap();
    assert_relative_eq!(mae.get_f64_data().unwrap()[0], 1.25);

    let mse = loss
        .loss_tensor(
            ErrorNormalization::ExpectedValueGreaterThanOne,
            LossType::MeanSquaredError,
        )
        .unwrap();
    assert_relative_eq!(mse.get_f64_data().unwrap()[0], 1.625);
}

#[test]
fn test_huber_matches_half_mse_for_small_errors() {
    let mut rng = StdRng::seed_from_u64(7);
    let expected: Vec<f64> = (0..32).map(|_| rng.gen_range(-5.0..5.0)).collect();
    let predictions: Vec<f64> = expected
        .iter()
        .map(|e| e + rng.gen_range(-0.9..0.9))
        .collect();
    let mask = vec![true; 32];
    let loss = single_task(predictions, expected, mask);

    let huber = loss
        .loss_tensor(ErrorNormalization::None, LossType::Huber)
        .unwrap();
    let mse = loss.mean_squared_error().unwrap();
    assert_relative_eq!(
        huber.get_f64_data().unwrap()[0],
        0.5 * mse.get_f64_data().unwrap()[0],
        max_relative = 1e-12
    );
}

#[test]
fn test_huber_is_linear_for_large_errors() {
    // |delta| = 2 and 3: per-element loss is |delta| - 0.5.
    let loss = single_task(vec![3.0, -1.0], vec![1.0, 2.0], vec![true, true]);
    let huber = loss
        .loss_tensor(ErrorNormalization::None, LossType::Huber)
        .unwrap();
    assert_relative_eq!(huber.get_f64_data().unwrap()[0], (1.5 + 2.5) / 2.0);
}

#[test]
fn test_huber_rejects_expected_value_normalization() {
    let loss = single_task(vec![1.0], vec![2.0], vec![true]);
    let result = loss.loss_tensor(
        ErrorNormalization::ExpectedValueGreaterThanOne,
        LossType::Huber,
    );
    assert!(matches!(result, Err(TaskLossError::NotImplemented(_))));
}

#[test]
fn test_ranking_rejects_expected_value_normalization() {
    let loss = single_task(vec![1.0], vec![2.0], vec![true]);
    let result = loss.loss_tensor(
        ErrorNormalization::ExpectedValueGreaterThanOne,
        LossType::RankingSoftmaxLoss,
    );
    assert!(matches!(result, Err(TaskLossError::NotImplemented(_))));
}

#[test]
fn test_ranking_loss_known_value() {
    // Equal scores give a uniform softmax; with relevance on one of two
    // samples the cross-entropy is ln 2.
    let loss = single_task(vec![0.0, 0.0], vec![1.0, 0.0], vec![true, true]);
    let ranking = loss
        .loss_tensor(ErrorNormalization::None, LossType::RankingSoftmaxLoss)
        .unwrap();
    assert_eq!(ranking.shape(), vec![1]);
    assert_relative_eq!(ranking.get_f64_data().unwrap()[0], 2.0f64.ln());
}

#[test]
fn test_loss_tensor_is_memoized_per_key() {
    let loss = single_task(vec![1.0, 2.0], vec![2.0, 2.0], vec![true, true]);

    let first = loss
        .loss_tensor(ErrorNormalization::None, LossType::MeanSquaredError)
        .unwrap();
    let second = loss
        .loss_tensor(ErrorNormalization::None, LossType::MeanSquaredError)
        .unwrap();
    assert!(first.ptr_eq(&second), "same key must share storage");

    // Convenience accessors go through the same cache.
    let third = loss.mean_squared_error().unwrap();
    assert!(first.ptr_eq(&third));

    let other_type = loss.mean_absolute_error().unwrap();
    assert!(!first.ptr_eq(&other_type), "distinct keys are distinct entries");

    let other_normalization = loss
        .loss_tensor(
            ErrorNormalization::PercentageError,
            LossType::MeanSquaredError,
        )
        .unwrap();
    assert!(!first.ptr_eq(&other_normalization));
}

#[test]
fn test_no_percentile_ranks_yields_empty_tensors() {
    let loss = single_task(vec![1.0], vec![2.0], vec![true]);
    let percentiles = loss.absolute_error_percentiles();
    assert_eq!(percentiles.shape(), vec![0]);
    assert_eq!(percentiles.dtype(), DType::F64);
    assert_eq!(
        loss.absolute_percentage_error_percentiles().shape(),
        vec![0]
    );
}

#[test]
fn test_percentile_tensors_shape_and_values() {
    let predictions = Tensor::new_f64(vec![1.0, 2.0, 3.0, 4.0], vec![4, 1]).unwrap();
    let expected = Tensor::new_f64(vec![1.0, 2.0, 3.0, 5.0], vec![4, 1]).unwrap();
    let mask = Tensor::new_bool(vec![true; 4], vec![4, 1]).unwrap();
    let loss =
        LossComputation::new(&predictions, &expected, &mask, DType::F64, &[0, 50, 100]).unwrap();

    let percentiles = loss.absolute_error_percentiles();
    assert_eq!(percentiles.shape(), vec![3, 1]);
    let data = percentiles.get_f64_data().unwrap();
    // Absolute errors are [0, 0, 0, 1].
    assert_relative_eq!(data[0], 0.0);
    assert_relative_eq!(data[1], 0.0);
    assert_relative_eq!(data[2], 1.0);
}

#[test]
fn test_percentiles_are_monotone_in_rank() {
    let mut rng = StdRng::seed_from_u64(17);
    let noise = Normal::new(0.0f64, 10.0).unwrap();
    let samples = 64;
    let tasks = 3;

    let mut predictions = Vec::with_capacity(samples * tasks);
    let mut expected = Vec::with_capacity(samples * tasks);
    let mut mask = Vec::with_capacity(samples * tasks);
    for _ in 0..samples * tasks {
        let e = 100.0 + noise.sample(&mut rng);
        expected.push(e);
        predictions.push(e + noise.sample(&mut rng));
        mask.push(rng.gen_bool(0.7));
    }
    let predictions = Tensor::new_f64(predictions, vec![samples, tasks]).unwrap();
    let expected = Tensor::new_f64(expected, vec![samples, tasks]).unwrap();
    let mask = Tensor::new_bool(mask, vec![samples, tasks]).unwrap();

    let ranks = [5u32, 25, 50, 75, 95];
    let loss =
        LossComputation::new(&predictions, &expected, &mask, DType::F64, &ranks).unwrap();

    for percentiles in [
        loss.absolute_error_percentiles(),
        loss.absolute_percentage_error_percentiles(),
    ] {
        assert_eq!(percentiles.shape(), vec![ranks.len(), tasks]);
        let data = percentiles.get_f64_data().unwrap();
        for task in 0..tasks {
            for i in 0..ranks.len() - 1 {
                let lower = data[i * tasks + task];
                let upper = data[(i + 1) * tasks + task];
                assert!(
                    lower <= upper,
                    "percentiles must be monotone: rank {} -> {} gave {} > {}",
                    ranks[i],
                    ranks[i + 1],
                    lower,
                    upper
                );
            }
        }
    }
}

#[test]
fn test_f32_inputs() {
    let predictions = Tensor::new(vec![1.0f32, 2.0, 3.0, 4.0], vec![4, 1]).unwrap();
    let expected = Tensor::new(vec![1.0f32, 2.0, 3.0, 5.0], vec![4, 1]).unwrap();
    let mask = Tensor::new_bool(vec![true; 4], vec![4, 1]).unwrap();
    let loss =
        LossComputation::new(&predictions, &expected, &mask, DType::F32, &[50]).unwrap();

    assert_eq!(loss.dtype(), DType::F32);
    let mse = loss.mean_squared_error().unwrap();
    assert_eq!(mse.dtype(), DType::F32);
    assert_relative_eq!(mse.get_f32_data().unwrap()[0], 0.25f32);
    assert_eq!(loss.absolute_error_percentiles().dtype(), DType::F32);
}
