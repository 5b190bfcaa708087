//! Online update rules
//!
//! Each rule is one step of the NORMA family of algorithms from
//! "Online Learning with Kernels" (Kivinen, Smola, Williamson): predict with
//! the current model, decide whether the example is a significant error,
//! admit it as a support vector if so, then adapt the scalar statistics.
//!
//! Unlike the textbook algorithm, admitted weights are never decayed and
//! non-violating examples are not stored.

pub mod classification;
pub mod novelty;
pub mod regression;

pub use self::classification::*;
pub use self::novelty::*;
pub use self::regression::*;

use crate::core::{LearningParams, Result, SVMError, StepOutcome, Task};
use crate::kernel::Kernel;
use crate::model::Model;

/// Lower bound for rho
pub const MIN_RHO: f64 = 1e-6;

/// One per-example transition of a model
///
/// `step` either applies the whole update or returns an error without
/// touching the model.
pub trait UpdateRule {
    /// Training example consumed by one step
    type Example: ?Sized;

    /// Task the produced model solves
    fn task(&self) -> Task;

    /// Hyperparameters driving the rule
    fn params(&self) -> &LearningParams;

    /// Apply one example to `model`
    fn step<K: Kernel + ?Sized>(
        &self,
        model: &mut Model,
        kernel: &K,
        example: &Self::Example,
    ) -> Result<StepOutcome>;

    /// Pure form of [`UpdateRule::step`]: old model + example -> new model
    fn update<K: Kernel + ?Sized>(
        &self,
        mut model: Model,
        kernel: &K,
        example: &Self::Example,
    ) -> Result<Model> {
        self.step(&mut model, kernel, example)?;
        Ok(model)
    }
}

/// Prediction of the current model for `x`, after validating the input
pub(crate) fn predict_for_update<K: Kernel + ?Sized>(
    model: &Model,
    kernel: &K,
    x: &[f64],
) -> Result<f64> {
    if x.is_empty() {
        return Err(SVMError::InvalidParameter(
            "Training examples need at least one feature".to_string(),
        ));
    }
    model.support_vectors.check_dimension(x)?;
    check_finite_features(x)?;

    let prediction = model.decision_value(kernel, x)?;
    if !prediction.is_finite() {
        return Err(SVMError::NumericInstability(format!(
            "prediction is not finite after {} observations: {prediction}",
            model.stats.observation_count
        )));
    }
    Ok(prediction)
}

pub(crate) fn check_finite_features(x: &[f64]) -> Result<()> {
    match x.iter().find(|v| !v.is_finite()) {
        Some(value) => Err(SVMError::NumericInstability(format!(
            "feature value is not finite: {value}"
        ))),
        None => Ok(()),
    }
}

/// Learning rate for the next example under the configured schedule
pub(crate) fn current_rate(params: &LearningParams, model: &Model) -> f64 {
    params
        .schedule
        .rate(params.eta, model.stats.observation_count + 1)
}

pub(crate) fn check_finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SVMError::NumericInstability(format!(
            "{name} is not finite: {value}"
        )))
    }
}
