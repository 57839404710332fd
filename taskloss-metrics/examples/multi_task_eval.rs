// taskloss-metrics/examples/multi_task_eval.rs
//
// Evaluates a small two-task batch and prints the per-task losses and
// error percentiles.

use taskloss_core::{DType, Tensor};
use taskloss_metrics::{ErrorNormalization, LossComputation, LossType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 5 samples, 2 tasks; task 1 has no ground truth for two samples.
    let predictions = Tensor::new_f64(
        vec![
            98.0, 21.0, //
            205.0, 18.0, //
            310.0, 25.0, //
            395.0, 31.0, //
            505.0, 38.0,
        ],
        vec![5, 2],
    )?;
    let expected = Tensor::new_f64(
        vec![
            100.0, 20.0, //
            200.0, 20.0, //
            300.0, 30.0, //
            400.0, 30.0, //
            500.0, 40.0,
        ],
        vec![5, 2],
    )?;
    let mask = Tensor::new_bool(
        vec![
            true, true, //
            true, false, //
            true, true, //
            true, false, //
            true, true,
        ],
        vec![5, 2],
    )?;

    let loss = LossComputation::new(&predictions, &expected, &mask, DType::F64, &[50, 90])?;

    println!("tasks: {}", loss.num_tasks());
    println!("MAE:  {:?}", loss.mean_absolute_error()?.get_f64_data()?);
    println!("MSE:  {:?}", loss.mean_squared_error()?.get_f64_data()?);
    println!(
        "MAPE: {:?}",
        loss.mean_absolute_percentage_error()?.get_f64_data()?
    );
    println!(
        "Huber: {:?}",
        loss.loss_tensor(ErrorNormalization::None, LossType::Huber)?
            .get_f64_data()?
    );
    println!(
        "ranking softmax: {:?}",
        loss.loss_tensor(ErrorNormalization::None, LossType::RankingSoftmaxLoss)?
            .get_f64_data()?
    );
    println!(
        "absolute error percentiles (rank-major): {:?}",
        loss.absolute_error_percentiles().get_f64_data()?
    );
    Ok(())
}
