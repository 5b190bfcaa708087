//! Training drivers
//!
//! This module folds example streams through the update rules in
//! [`crate::solver`] and trains independent models on disjoint partitions.

pub mod state;

pub use self::state::*;

use crate::core::{LearningParams, Result, SVMError, Sample, Task};
use crate::kernel::Kernel;
use crate::model::Model;
use crate::predict::Ensemble;
use crate::solver::{ClassificationRule, NoveltyRule, RegressionRule};
use log::debug;
use std::borrow::Borrow;
use std::thread;

/// Train a regression model on a stream of labelled examples
pub fn train_regression<I, K>(examples: I, kernel: &K, params: LearningParams) -> Result<Model>
where
    I: IntoIterator,
    I::Item: Borrow<Sample>,
    K: Kernel + ?Sized,
{
    let rule = RegressionRule::new(params)?;
    log_start(Task::Regression, kernel, &params);

    let mut state = ModelState::new(rule, kernel);
    for example in examples {
        state.push(example.borrow())?;
    }
    Ok(log_finish(state.finish()))
}

/// Train a binary classifier on a stream of examples labelled -1 or +1
pub fn train_classification<I, K>(examples: I, kernel: &K, params: LearningParams) -> Result<Model>
where
    I: IntoIterator,
    I::Item: Borrow<Sample>,
    K: Kernel + ?Sized,
{
    let rule = ClassificationRule::new(params)?;
    log_start(Task::Classification, kernel, &params);

    let mut state = ModelState::new(rule, kernel);
    for example in examples {
        state.push(example.borrow())?;
    }
    Ok(log_finish(state.finish()))
}

/// Train a novelty detector on a stream of unlabelled vectors
pub fn train_novelty_detection<I, K>(
    examples: I,
    kernel: &K,
    params: LearningParams,
) -> Result<Model>
where
    I: IntoIterator,
    I::Item: AsRef<[f64]>,
    K: Kernel + ?Sized,
{
    let rule = NoveltyRule::new(params)?;
    log_start(Task::NoveltyDetection, kernel, &params);

    let mut state = ModelState::new(rule, kernel);
    for example in examples {
        state.push(example.as_ref())?;
    }
    Ok(log_finish(state.finish()))
}

/// Train a model for `task` on a slice of samples
///
/// Novelty detection ignores the labels.
pub fn train_task<K: Kernel + ?Sized>(
    task: Task,
    samples: &[Sample],
    kernel: &K,
    params: LearningParams,
) -> Result<Model> {
    match task {
        Task::Regression => train_regression(samples, kernel, params),
        Task::Classification => train_classification(samples, kernel, params),
        Task::NoveltyDetection => train_novelty_detection(
            samples.iter().map(|s| s.features.as_slice()),
            kernel,
            params,
        ),
    }
}

/// Split `examples` round-robin into `partitions` disjoint, order-preserving parts
pub fn split_round_robin<T>(examples: Vec<T>, partitions: usize) -> Result<Vec<Vec<T>>> {
    if partitions == 0 {
        return Err(SVMError::InvalidParameter(
            "Number of partitions must be positive".to_string(),
        ));
    }
    if examples.len() < partitions {
        return Err(SVMError::InvalidParameter(format!(
            "Cannot split {} examples into {partitions} non-empty partitions",
            examples.len()
        )));
    }

    let mut parts: Vec<Vec<T>> = (0..partitions)
        .map(|_| Vec::with_capacity(examples.len() / partitions + 1))
        .collect();
    for (i, example) in examples.into_iter().enumerate() {
        parts[i % partitions].push(example);
    }
    Ok(parts)
}

/// Train one model per partition, each on its own thread
///
/// Models are returned in partition order. The first failing partition's
/// error is returned and no ensemble is produced.
pub fn train_partitioned<T, F>(examples: Vec<T>, partitions: usize, train: F) -> Result<Ensemble>
where
    T: Send,
    F: Fn(&[T]) -> Result<Model> + Sync,
{
    let parts = split_round_robin(examples, partitions)?;
    debug!("Training {} independent models", parts.len());

    let train = &train;
    let results: Vec<Result<Model>> = thread::scope(|scope| {
        let handles: Vec<_> = parts
            .into_iter()
            .map(|part| scope.spawn(move || train(part.as_slice())))
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let models = results.into_iter().collect::<Result<Vec<Model>>>()?;
    Ok(Ensemble::new(models))
}

fn log_start<K: Kernel + ?Sized>(task: Task, kernel: &K, params: &LearningParams) {
    debug!(
        "Training {task} model: kernel={}, eta={}, nu={}, slambda={}, schedule={:?}",
        kernel.spec(),
        params.eta,
        params.nu,
        params.slambda,
        params.schedule
    );
}

fn log_finish(model: Model) -> Model {
    debug!(
        "Finished {} model: {} observations, {} support vectors, cumulative error {:.6}",
        model.task(),
        model.observation_count(),
        model.n_support_vectors(),
        model.cumulative_error()
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{DotKernel, GaussianKernel, KernelFunction};
    use approx::assert_relative_eq;

    fn separable_samples() -> Vec<Sample> {
        vec![
            Sample::new(vec![2.0, 1.0], 1.0),
            Sample::new(vec![-2.0, -1.0], -1.0),
            Sample::new(vec![1.5, 0.8], 1.0),
            Sample::new(vec![-1.5, -0.8], -1.0),
            Sample::new(vec![1.8, 0.9], 1.0),
            Sample::new(vec![-1.8, -0.9], -1.0),
        ]
    }

    #[test]
    fn test_train_classification_single_example() {
        let samples = vec![Sample::new(vec![1.0, -1.0], 1.0)];
        let model =
            train_classification(&samples, &DotKernel::new(), LearningParams::default()).unwrap();

        assert_eq!(model.observation_count(), 1);
        assert_eq!(model.n_support_vectors(), 1);
        assert_eq!(model.support_vectors().weights(), &[0.1]);
    }

    #[test]
    fn test_train_classification_separates() {
        let samples = separable_samples();
        let kernel = DotKernel::new();
        let model = train_classification(&samples, &kernel, LearningParams::default()).unwrap();

        for sample in &samples {
            let value = model.decision_value(&kernel, &sample.features).unwrap();
            assert_eq!(value.signum(), sample.label);
        }
    }

    #[test]
    fn test_train_accepts_owned_and_borrowed_streams() {
        let samples = separable_samples();
        let kernel = KernelFunction::dot();

        let borrowed = train_classification(&samples, &kernel, LearningParams::default()).unwrap();
        let owned =
            train_classification(samples.clone(), &kernel, LearningParams::default()).unwrap();
        assert_eq!(borrowed, owned);
    }

    #[test]
    fn test_train_regression_tracks_linear_target() {
        let samples: Vec<Sample> = (0..200)
            .map(|i| {
                let x = (i % 20) as f64 / 10.0 - 1.0;
                Sample::new(vec![x], 2.0 * x)
            })
            .collect();
        let kernel = DotKernel::new();
        let model = train_regression(&samples, &kernel, LearningParams::default()).unwrap();

        assert_eq!(model.observation_count(), 200);
        assert!(model.n_support_vectors() <= 200);
        let prediction = model.decision_value(&kernel, &[0.5]).unwrap();
        assert!(prediction > 0.0);
    }

    #[test]
    fn test_train_novelty_detection() {
        let points = vec![vec![0.0, 0.0], vec![0.1, 0.0], vec![0.0, 0.1]];
        let kernel = GaussianKernel::new(1.0).unwrap();
        let model = train_novelty_detection(&points, &kernel, LearningParams::default()).unwrap();

        assert_eq!(model.task(), Task::NoveltyDetection);
        assert_eq!(model.observation_count(), 3);
        assert_eq!(model.vector_dimension(), Some(2));
    }

    #[test]
    fn test_train_rejects_invalid_parameters_before_training() {
        let params = LearningParams {
            eta: 1.5,
            ..Default::default()
        };
        // The stream is never consumed
        let examples = std::iter::from_fn(|| -> Option<Sample> {
            panic!("stream should not be read")
        });
        let result = train_classification(examples, &DotKernel::new(), params);
        assert!(matches!(result, Err(SVMError::InvalidParameter(_))));
    }

    #[test]
    fn test_train_aborts_on_dimension_mismatch() {
        let samples = vec![
            Sample::new(vec![1.0, 2.0], 1.0),
            Sample::new(vec![1.0], 2.0),
        ];
        let result = train_regression(&samples, &DotKernel::new(), LearningParams::default());
        assert!(matches!(
            result,
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_train_rejects_zero_width_examples() {
        let kernel = DotKernel::new();
        let samples = vec![Sample::new(Vec::new(), 1.0)];
        for task in [Task::Regression, Task::Classification] {
            assert!(matches!(
                train_task(task, &samples, &kernel, LearningParams::default()),
                Err(SVMError::InvalidParameter(_))
            ));
        }

        let points: Vec<Vec<f64>> = vec![Vec::new()];
        assert!(matches!(
            train_novelty_detection(&points, &kernel, LearningParams::default()),
            Err(SVMError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_stream_gives_empty_model() {
        let samples: Vec<Sample> = Vec::new();
        let model = train_regression(&samples, &DotKernel::new(), LearningParams::default()).unwrap();
        assert_eq!(model.observation_count(), 0);
        assert_eq!(model.vector_dimension(), None);
        assert_eq!(model.decision_value(&DotKernel::new(), &[1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_train_task_dispatch() {
        let samples = separable_samples();
        let kernel = DotKernel::new();
        let params = LearningParams::default();

        for task in [Task::Regression, Task::Classification, Task::NoveltyDetection] {
            let model = train_task(task, &samples, &kernel, params).unwrap();
            assert_eq!(model.task(), task);
            assert_eq!(model.observation_count(), samples.len() as u64);
        }

        let features: Vec<&[f64]> = samples.iter().map(|s| s.features.as_slice()).collect();
        assert_eq!(
            train_task(Task::NoveltyDetection, &samples, &kernel, params).unwrap(),
            train_novelty_detection(features, &kernel, params).unwrap()
        );
    }

    #[test]
    fn test_split_round_robin() {
        let parts = split_round_robin((0..7).collect(), 3).unwrap();
        assert_eq!(parts, vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]]);

        assert!(split_round_robin(vec![1, 2], 0).is_err());
        assert!(split_round_robin(vec![1, 2], 3).is_err());
    }

    #[test]
    fn test_train_partitioned_matches_sequential_training() {
        let samples = separable_samples();
        let kernel = DotKernel::new();
        let params = LearningParams::default();

        let ensemble = train_partitioned(samples.clone(), 2, |part| {
            train_classification(part, &kernel, params)
        })
        .unwrap();
        assert_eq!(ensemble.len(), 2);

        let parts = split_round_robin(samples, 2).unwrap();
        for (model, part) in ensemble.models().iter().zip(&parts) {
            let expected = train_classification(part, &kernel, params).unwrap();
            assert_eq!(model, &expected);
            assert_eq!(model.observation_count(), 3);
        }

        let avg = ensemble.predict(&[1.0, 0.5], &kernel).unwrap();
        let values: Vec<f64> = avg.iter().map(|(_, v)| *v).collect();
        assert_relative_eq!(values[2], (values[0] + values[1]) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_train_partitioned_propagates_errors() {
        let samples = vec![
            Sample::new(vec![1.0], 1.0),
            Sample::new(vec![1.0], 1.0),
            Sample::new(vec![1.0], 0.5),
            Sample::new(vec![1.0], -1.0),
        ];
        let kernel = DotKernel::new();
        let result = train_partitioned(samples, 2, |part| {
            train_classification(part, &kernel, LearningParams::default())
        });
        assert!(matches!(result, Err(SVMError::InvalidLabel(_))));
    }
}
