use anyhow::{bail, Context};
use linfa::traits::Fit;
use linfa::Dataset as LinfaDataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::Array2;

use crate::config::{ModelConfig, ModelKind, ModelType};
use crate::data_handling::Cohort;
use crate::error::EnsembleError;
use crate::models::classifier_trait::BinaryClassifier;

/// Logistic regression classifier over linfa-logistic.
pub struct LogisticRegressionClassifier {
    model: Option<FittedLogisticRegression<f64, i32>>,
    schema: Option<Vec<String>>,
    config: ModelConfig,
}

impl LogisticRegressionClassifier {
    pub fn new(config: ModelConfig) -> Self {
        LogisticRegressionClassifier {
            model: None,
            schema: None,
            config,
        }
    }
}

impl BinaryClassifier for LogisticRegressionClassifier {
    fn fit(&mut self, cohort: &Cohort) -> anyhow::Result<()> {
        let ModelType::LogisticRegression {
            max_iterations,
            gradient_tolerance,
        } = self.config.model_type
        else {
            bail!(
                "Expected logistic regression parameters, got {:?}",
                self.config.model_type
            );
        };

        let dataset = LinfaDataset::new(cohort.x.clone(), cohort.y.clone());
        let model = LogisticRegression::default()
            .max_iterations(max_iterations)
            .gradient_tolerance(gradient_tolerance)
            .fit(&dataset)
            .context("Logistic regression fit failed")?;

        self.model = Some(model);
        self.schema = Some(cohort.schema().to_vec());
        Ok(())
    }

    fn predict_positive_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, EnsembleError> {
        let model = self.model.as_ref().ok_or_else(|| EnsembleError::CapabilityError {
            kind: self.kind(),
            reason: "model has not been fitted".to_string(),
        })?;

        // linfa-logistic treats the numerically larger of the two training
        // labels as the positive class, so with {1, 2} diagnosis codes the
        // returned probabilities are P(patient).
        Ok(model.predict_probabilities(x).to_vec())
    }

    fn kind(&self) -> ModelKind {
        ModelKind::LogisticRegression
    }

    fn feature_schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }
}
