use anyhow::{bail, Context};
use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset as LinfaDataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::Array2;

use crate::config::{ModelConfig, ModelKind, ModelType};
use crate::data_handling::Cohort;
use crate::error::EnsembleError;
use crate::models::classifier_trait::BinaryClassifier;

/// Support-vector machine classifier over linfa-svm.
///
/// Probability calibration is decided at fit time: with `probability: true`
/// the model is fitted with Platt scaling and answers probability queries,
/// otherwise only decision margins exist and a probability query fails.
pub struct SvmClassifier {
    model: Option<FittedSvm>,
    schema: Option<Vec<String>>,
    config: ModelConfig,
}

enum FittedSvm {
    Calibrated(Svm<f64, Pr>),
    MarginOnly(Svm<f64, bool>),
}

impl SvmClassifier {
    pub fn new(config: ModelConfig) -> Self {
        SvmClassifier {
            model: None,
            schema: None,
            config,
        }
    }
}

impl BinaryClassifier for SvmClassifier {
    fn fit(&mut self, cohort: &Cohort) -> anyhow::Result<()> {
        let ModelType::Svm {
            eps,
            c,
            ref kernel,
            gaussian_kernel_eps,
            polynomial_kernel_constant,
            polynomial_kernel_degree,
            probability,
        } = self.config.model_type
        else {
            bail!("Expected SVM parameters, got {:?}", self.config.model_type);
        };

        let (c_pos, c_neg) = c;
        let targets = cohort.positive_targets();
        let dataset = LinfaDataset::new(cohort.x.clone(), targets);

        let fitted = if probability {
            let mut params: SvmParams<f64, Pr> =
                Svm::<f64, Pr>::params().eps(eps).pos_neg_weights(c_pos, c_neg);
            params = apply_kernel(
                params,
                kernel,
                gaussian_kernel_eps,
                polynomial_kernel_constant,
                polynomial_kernel_degree,
            )?;
            let model = <SvmParams<f64, Pr> as Fit<_, _, _>>::fit(&params, &dataset)
                .context("SVM fit (with Platt calibration) failed")?;
            FittedSvm::Calibrated(model)
        } else {
            let mut params: SvmParams<f64, bool> =
                Svm::<f64, bool>::params().eps(eps).pos_neg_weights(c_pos, c_neg);
            params = apply_kernel(
                params,
                kernel,
                gaussian_kernel_eps,
                polynomial_kernel_constant,
                polynomial_kernel_degree,
            )?;
            let model = <SvmParams<f64, bool> as Fit<_, _, _>>::fit(&params, &dataset)
                .context("SVM fit failed")?;
            FittedSvm::MarginOnly(model)
        };

        self.model = Some(fitted);
        self.schema = Some(cohort.schema().to_vec());
        Ok(())
    }

    fn predict_positive_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, EnsembleError> {
        match self.model.as_ref() {
            // The Pr targets are calibrated probabilities of the boolean
            // positive target, i.e. P(patient) by construction of the
            // training targets.
            Some(FittedSvm::Calibrated(model)) => {
                let probs = model.predict(x);
                Ok(probs.iter().map(|p| f64::from(**p)).collect())
            }
            Some(FittedSvm::MarginOnly(_)) => Err(EnsembleError::CapabilityError {
                kind: self.kind(),
                reason: "model was fitted without probability calibration".to_string(),
            }),
            None => Err(EnsembleError::CapabilityError {
                kind: self.kind(),
                reason: "model has not been fitted".to_string(),
            }),
        }
    }

    fn kind(&self) -> ModelKind {
        ModelKind::SupportVectorMachine
    }

    fn feature_schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }
}

fn apply_kernel<T>(
    params: SvmParams<f64, T>,
    kernel: &str,
    gaussian_eps: f64,
    poly_constant: f64,
    poly_degree: f64,
) -> anyhow::Result<SvmParams<f64, T>> {
    Ok(match kernel {
        "linear" => params.linear_kernel(),
        "gauss" => params.gaussian_kernel(gaussian_eps),
        "poly" => params.polynomial_kernel(poly_constant, poly_degree),
        other => bail!(
            "Unsupported kernel type: {}. Valid options are: linear, gauss, poly",
            other
        ),
    })
}
