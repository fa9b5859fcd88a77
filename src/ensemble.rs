//! Probability-averaging ensemble over heterogeneous fitted classifiers.
//!
//! Each model contributes its estimated probability of the patient class
//! per row; the ensemble takes the unweighted arithmetic mean and
//! thresholds it at 0.5. Averaging is commutative, so the model order
//! never changes the result, but evaluation is sequential in input order
//! so diagnostics are stable.

use crate::data_handling::{Cohort, NEGATIVE_LABEL, POSITIVE_LABEL};
use crate::error::EnsembleError;
use crate::models::classifier_trait::BinaryClassifier;

/// Per-row averaged probabilities and thresholded class labels.
///
/// Produced fresh per scoring call; row order matches the scored cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleResult {
    /// Mean probability of the patient class, one per row.
    pub probabilities: Vec<f64>,
    /// Thresholded diagnosis labels (1 or 2), one per row.
    pub labels: Vec<i32>,
}

impl EnsembleResult {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Score a cohort with an ensemble of fitted models.
///
/// For every model, in input order: validate its recorded feature schema
/// against the cohort, query its probability of the patient class per row,
/// and reject any probability outside [0, 1]. The per-model probabilities
/// are then averaged element-wise and thresholded, with exactly 0.5 mapping
/// to the control class.
///
/// A single per-model failure aborts the whole call; no partial ensemble is
/// ever returned. Inputs are never mutated.
pub fn score(
    models: &[Box<dyn BinaryClassifier>],
    cohort: &Cohort,
) -> Result<EnsembleResult, EnsembleError> {
    if models.is_empty() {
        return Err(EnsembleError::EmptyEnsemble);
    }
    let n_rows = cohort.n_samples();
    if n_rows == 0 {
        return Err(EnsembleError::EmptyCohort);
    }

    let mut summed = vec![0.0f64; n_rows];
    for (index, model) in models.iter().enumerate() {
        if let Some(expected) = model.feature_schema() {
            if expected != cohort.schema() {
                return Err(EnsembleError::SchemaMismatch {
                    kind: model.kind(),
                    index,
                    expected: expected.to_vec(),
                    found: cohort.schema().to_vec(),
                });
            }
        }

        let probs = model.predict_positive_proba(&cohort.x)?;
        debug_assert_eq!(probs.len(), n_rows);

        for (row, &p) in probs.iter().enumerate() {
            if !(0.0..=1.0).contains(&p) {
                return Err(EnsembleError::ProbabilityOutOfRange {
                    kind: model.kind(),
                    row,
                    value: p,
                });
            }
            summed[row] += p;
        }

        log::debug!("Collected probabilities from {} (model #{})", model.name(), index);
    }

    let n_models = models.len() as f64;
    let probabilities: Vec<f64> = summed.into_iter().map(|s| s / n_models).collect();
    let labels: Vec<i32> = probabilities
        .iter()
        .map(|&p| if p > 0.5 { POSITIVE_LABEL } else { NEGATIVE_LABEL })
        .collect();

    Ok(EnsembleResult {
        probabilities,
        labels,
    })
}
