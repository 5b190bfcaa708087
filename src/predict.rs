//! Prediction with trained models and ensembles
//!
//! Everything here is read-only over finished models, so a single model or
//! an ensemble can be shared freely between threads answering queries.

use crate::core::{Prediction, Result, SVMError, Task};
use crate::kernel::{check_dimensions, Kernel};
use crate::model::Model;
use crate::solver::{check_finite, check_finite_features};
use log::warn;
use std::fmt;

/// f(x) for one model
///
/// Fails with `DimensionMismatch` when `x` does not have the model's vector
/// dimension and with `NumericInstability` when `x` or f(x) is not finite.
/// A model without support vectors returns its offset.
pub fn predict_single<K: Kernel + ?Sized>(model: &Model, x: &[f64], kernel: &K) -> Result<f64> {
    if let Some(expected) = model.vector_dimension() {
        check_dimensions(expected, x.len())?;
    }
    check_finite_features(x)?;
    let spec = kernel.spec();
    if &spec != model.kernel() {
        warn!(
            "Evaluating a model trained with {} using {}",
            model.kernel(),
            spec
        );
    }
    check_finite("decision value", model.decision_value(kernel, x)?)
}

/// f(x) for every row of `xs`
pub fn predict_batch<K, X>(model: &Model, xs: &[X], kernel: &K) -> Result<Vec<f64>>
where
    K: Kernel + ?Sized,
    X: AsRef<[f64]>,
{
    xs.iter()
        .map(|x| predict_single(model, x.as_ref(), kernel))
        .collect()
}

/// Sign of f(x) for a classification model
pub fn classify<K: Kernel + ?Sized>(model: &Model, x: &[f64], kernel: &K) -> Result<Prediction> {
    expect_task(model, Task::Classification)?;
    Ok(Prediction::from_decision_value(predict_single(
        model, x, kernel,
    )?))
}

/// Whether `x` falls below the novelty threshold rho
pub fn is_novel<K: Kernel + ?Sized>(model: &Model, x: &[f64], kernel: &K) -> Result<bool> {
    expect_task(model, Task::NoveltyDetection)?;
    Ok(predict_single(model, x, kernel)? < model.rho())
}

fn expect_task(model: &Model, task: Task) -> Result<()> {
    if model.task() == task {
        Ok(())
    } else {
        Err(SVMError::InvalidParameter(format!(
            "Expected a {task} model, got a {} model",
            model.task()
        )))
    }
}

/// Name of one entry in an ensemble prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsembleLabel {
    /// Prediction of the ensemble member at this index
    Model(usize),
    /// Mean of all member predictions
    Average,
}

impl fmt::Display for EnsembleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnsembleLabel::Model(i) => write!(f, "model{i}"),
            EnsembleLabel::Average => write!(f, "avg"),
        }
    }
}

/// Evaluate every model at `x`, then append their mean as `avg`
///
/// Requires at least two models.
pub fn predict_ensemble<K: Kernel + ?Sized>(
    models: &[Model],
    x: &[f64],
    kernel: &K,
) -> Result<Vec<(EnsembleLabel, f64)>> {
    match models.len() {
        0 => return Err(SVMError::EmptyEnsemble),
        1 => return Err(SVMError::SingleModelEnsemble),
        _ => {}
    }

    let mut entries = models
        .iter()
        .enumerate()
        .map(|(i, model)| Ok((EnsembleLabel::Model(i), predict_single(model, x, kernel)?)))
        .collect::<Result<Vec<_>>>()?;

    let mean = entries.iter().map(|(_, value)| value).sum::<f64>() / models.len() as f64;
    entries.push((EnsembleLabel::Average, mean));
    Ok(entries)
}

/// Independently trained models combined at prediction time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ensemble {
    models: Vec<Model>,
}

impl Ensemble {
    pub fn new(models: Vec<Model>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn into_models(self) -> Vec<Model> {
        self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// See [`predict_ensemble`]
    pub fn predict<K: Kernel + ?Sized>(
        &self,
        x: &[f64],
        kernel: &K,
    ) -> Result<Vec<(EnsembleLabel, f64)>> {
        predict_ensemble(&self.models, x, kernel)
    }

    /// Mean prediction only
    pub fn predict_mean<K: Kernel + ?Sized>(&self, x: &[f64], kernel: &K) -> Result<f64> {
        let entries = self.predict(x, kernel)?;
        entries
            .last()
            .map(|(_, mean)| *mean)
            .ok_or(SVMError::EmptyEnsemble)
    }
}

impl From<Vec<Model>> for Ensemble {
    fn from(models: Vec<Model>) -> Self {
        Self::new(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LearningParams, Sample};
    use crate::kernel::{DotKernel, GaussianKernel, KernelSpec};
    use crate::optimizer::{train_classification, train_novelty_detection, train_regression};
    use approx::assert_relative_eq;

    fn classifier() -> Model {
        let samples = vec![
            Sample::new(vec![1.0, -1.0], 1.0),
            Sample::new(vec![-1.0, 1.0], -1.0),
        ];
        train_classification(&samples, &DotKernel::new(), LearningParams::default()).unwrap()
    }

    #[test]
    fn test_predict_single() {
        let model = classifier();
        let kernel = DotKernel::new();

        // 0.1 * 2 + (-0.1) * (-2); the second example had margin 0.2 < rho
        let value = predict_single(&model, &[1.0, -1.0], &kernel).unwrap();
        assert_relative_eq!(value, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_predict_single_dimension_mismatch_leaves_model_unmodified() {
        let model = classifier();
        let before = model.clone();

        let result = predict_single(&model, &[1.0, 2.0, 3.0], &DotKernel::new());
        assert!(matches!(
            result,
            Err(SVMError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert_eq!(model, before);
    }

    #[test]
    fn test_predict_single_rejects_non_finite_query() {
        let model = classifier();
        let kernel = DotKernel::new();

        for x in [[f64::NAN, 0.0], [1.0, f64::INFINITY]] {
            assert!(matches!(
                predict_single(&model, &x, &kernel),
                Err(SVMError::NumericInstability(_))
            ));
        }
        assert!(matches!(
            predict_batch(&model, &[vec![1.0, -1.0], vec![f64::NAN, 1.0]], &kernel),
            Err(SVMError::NumericInstability(_))
        ));
    }

    #[test]
    fn test_predict_single_rejects_overflowing_value() {
        let mut model = Model::new(Task::Regression, KernelSpec::Dot);
        model.support_vectors.append(1.0, vec![1e200]).unwrap();

        let result = predict_single(&model, &[1e200], &DotKernel::new());
        assert!(matches!(result, Err(SVMError::NumericInstability(_))));
    }

    #[test]
    fn test_predict_single_empty_model_returns_offset() {
        let samples: Vec<Sample> = Vec::new();
        let model = train_regression(&samples, &DotKernel::new(), LearningParams::default()).unwrap();
        assert_eq!(
            predict_single(&model, &[1.0, 2.0], &DotKernel::new()).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_predict_batch() {
        let model = classifier();
        let rows = vec![vec![1.0, -1.0], vec![-1.0, 1.0]];
        let values = predict_batch(&model, &rows, &DotKernel::new()).unwrap();
        assert_eq!(values.len(), 2);
        assert!(values[0] > 0.0);
        assert!(values[1] < 0.0);
    }

    #[test]
    fn test_classify() {
        let model = classifier();
        let prediction = classify(&model, &[2.0, -1.0], &DotKernel::new()).unwrap();
        assert_eq!(prediction.label, 1.0);

        let prediction = classify(&model, &[-2.0, 1.0], &DotKernel::new()).unwrap();
        assert_eq!(prediction.label, -1.0);
    }

    #[test]
    fn test_is_novel() {
        let kernel = GaussianKernel::new(1.0).unwrap();
        let points: Vec<Vec<f64>> = (0..30).map(|i| vec![(i % 3) as f64 * 0.01]).collect();
        let model = train_novelty_detection(&points, &kernel, LearningParams::default()).unwrap();

        assert!(is_novel(&model, &[25.0], &kernel).unwrap());
        assert!(matches!(
            classify(&model, &[0.0], &kernel),
            Err(SVMError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ensemble_of_identical_models() {
        let model = classifier();
        let models = vec![model.clone(), model];
        let kernel = DotKernel::new();

        let entries = predict_ensemble(&models, &[0.5, 0.25], &kernel).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, EnsembleLabel::Model(0));
        assert_eq!(entries[1].0, EnsembleLabel::Model(1));
        assert_eq!(entries[2].0, EnsembleLabel::Average);
        assert_eq!(entries[0].1, entries[1].1);
        assert_relative_eq!(entries[2].1, entries[0].1, epsilon = 1e-12);
    }

    #[test]
    fn test_ensemble_average_is_mean() {
        let kernel = DotKernel::new();
        let models: Vec<Model> = (1..=4)
            .map(|k| {
                let samples = vec![Sample::new(vec![k as f64], 1.0)];
                train_classification(&samples, &kernel, LearningParams::default()).unwrap()
            })
            .collect();

        let entries = predict_ensemble(&models, &[1.5], &kernel).unwrap();
        let mean = entries[..4].iter().map(|(_, v)| v).sum::<f64>() / 4.0;
        assert_relative_eq!(entries[4].1, mean, epsilon = 1e-9);
    }

    #[test]
    fn test_ensemble_size_errors() {
        let kernel = DotKernel::new();
        assert!(matches!(
            predict_ensemble(&[], &[1.0], &kernel),
            Err(SVMError::EmptyEnsemble)
        ));
        assert!(matches!(
            predict_ensemble(&[classifier()], &[1.0, 1.0], &kernel),
            Err(SVMError::SingleModelEnsemble)
        ));
    }

    #[test]
    fn test_ensemble_dimension_mismatch() {
        let models = vec![classifier(), classifier()];
        let result = predict_ensemble(&models, &[1.0], &DotKernel::new());
        assert!(matches!(result, Err(SVMError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_ensemble_struct() {
        let ensemble = Ensemble::from(vec![classifier(), classifier()]);
        assert_eq!(ensemble.len(), 2);
        assert!(!ensemble.is_empty());

        let kernel = DotKernel::new();
        let mean = ensemble.predict_mean(&[1.0, -1.0], &kernel).unwrap();
        assert_relative_eq!(mean, 0.4, epsilon = 1e-12);
        assert_eq!(ensemble.into_models()[0].kernel(), &KernelSpec::Dot);
    }

    #[test]
    fn test_ensemble_label_display() {
        assert_eq!(EnsembleLabel::Model(0).to_string(), "model0");
        assert_eq!(EnsembleLabel::Model(12).to_string(), "model12");
        assert_eq!(EnsembleLabel::Average.to_string(), "avg");
    }
}
