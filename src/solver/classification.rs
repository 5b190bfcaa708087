//! ν-classification update with an adaptive margin

use crate::core::{LearningParams, Result, SVMError, Sample, StepOutcome, Task};
use crate::kernel::Kernel;
use crate::model::Model;
use crate::solver::{check_finite, current_rate, predict_for_update, UpdateRule, MIN_RHO};
use log::trace;

/// Binary classification rule for labels in {-1, +1}
///
/// An example is admitted when its functional margin `y * f(x)` falls below
/// rho. Each admission counts as one error and lowers rho by
/// `eta * (1 - nu)`; every confidently classified example raises it by
/// `eta * nu`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationRule {
    params: LearningParams,
}

impl ClassificationRule {
    /// Create the rule, rejecting out-of-range parameters
    pub fn new(params: LearningParams) -> Result<Self> {
        params.validate(Task::Classification)?;
        Ok(Self { params })
    }
}

impl UpdateRule for ClassificationRule {
    type Example = Sample;

    fn task(&self) -> Task {
        Task::Classification
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
        let label = example.label;
        if label != 1.0 && label != -1.0 {
            return Err(SVMError::InvalidLabel(label));
        }

        let prediction = predict_for_update(model, kernel, &example.features)?;
        let margin = check_finite("classification margin", label * prediction)?;

        let eta = current_rate(&self.params, model);
        let nu = self.params.nu;

        let admitted = model.support_vectors.is_empty() || margin < model.stats.rho;

        if admitted {
            model
                .support_vectors
                .append(eta * label, example.features.clone())?;
            model.stats.rho = (model.stats.rho - eta * (1.0 - nu)).max(MIN_RHO);
            model.stats.cumulative_error += 1.0;
        } else {
            model.stats.rho += eta * nu;
        }
        model.stats.observation_count += 1;

        trace!(
            "classification step {}: f(x)={prediction:.6}, margin={margin:.6}, admitted={admitted}, rho={:.6}",
            model.stats.observation_count,
            model.stats.rho
        );

        Ok(StepOutcome {
            prediction,
            loss: margin,
            admitted,
        })
    }
}
