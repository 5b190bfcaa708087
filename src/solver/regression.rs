//! ν-regression update with an adaptive epsilon tube

use crate::core::{LearningParams, Result, Sample, StepOutcome, Task};
use crate::kernel::Kernel;
use crate::model::{Model, SupportVectorSet};
use crate::solver::{check_finite, current_rate, predict_for_update, UpdateRule};
use log::trace;

/// Regression rule
///
/// An example is admitted when its absolute error leaves the epsilon tube.
/// The tube widens by `eta * (1 - nu)` on every admission and shrinks by
/// `eta * nu` otherwise, so roughly a `nu` fraction of examples end up
/// outside it.
///
/// The offset moves by `slambda * eta` toward the error on admission. On
/// every other step it shrinks toward zero by the fraction
/// `slambda * eta * |W| / (1 + |W|)`, where `W` is the weight sum. The more
/// mass the kernel expansion carries, the harder the bias is pulled; a model
/// whose weights cancel out keeps its bias.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionRule {
    params: LearningParams,
}

impl RegressionRule {
    /// Create the rule, rejecting out-of-range parameters
    pub fn new(params: LearningParams) -> Result<Self> {
        params.validate(Task::Regression)?;
        Ok(Self { params })
    }
}

impl UpdateRule for RegressionRule {
    type Example = Sample;

    fn task(&self) -> Task {
        Task::Regression
    }

    fn params(&self) -> &LearningParams {
        &self.params
    }

    fn step<K: Kernel + ?Sized>(
        &self,
        model: &mut Model,
        kernel: &K,
        example: &Sample,
    ) -> Result<StepOutcome> {
        let prediction = predict_for_update(model, kernel, &example.features)?;
        let error = check_finite("regression error", example.label - prediction)?;

        let eta = current_rate(&self.params, model);
        let nu = self.params.nu;
        let slambda = self.params.slambda;

        let admitted = model.support_vectors.is_empty() || error.abs() > model.stats.epsilon;
        let direction = if error >= 0.0 { 1.0 } else { -1.0 };

        if admitted {
            model
                .support_vectors
                .append(eta * direction, example.features.clone())?;
            model.stats.epsilon += eta * (1.0 - nu);
            model.stats.offset += slambda * eta * direction;
            model.stats.cumulative_error += error.abs();
        } else {
            model.stats.epsilon = (model.stats.epsilon - eta * nu).max(0.0);
            model.stats.offset -=
                slambda * eta * offset_pressure(&model.support_vectors) * model.stats.offset;
        }
        model.stats.observation_count += 1;

        trace!(
            "regression step {}: f(x)={prediction:.6}, error={error:.6}, admitted={admitted}, epsilon={:.6}",
            model.stats.observation_count,
            model.stats.epsilon
        );

        Ok(StepOutcome {
            prediction,
            loss: error,
            admitted,
        })
    }
}

/// |W| / (1 + |W|), in [0, 1)
fn offset_pressure(support_vectors: &SupportVectorSet) -> f64 {
    let mass = support_vectors.weight_sum().abs();
    mass / (1.0 + mass)
}
