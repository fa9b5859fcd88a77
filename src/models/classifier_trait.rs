use ndarray::Array2;

use crate::config::ModelKind;
use crate::data_handling::Cohort;
use crate::error::EnsembleError;

/// Contract shared by every fitted binary classifier the ensemble can hold.
///
/// Scoring is uniform across kinds: one probability of the patient class per
/// row, selected by the positive label value rather than by any
/// library-internal column position. Scoring never mutates the model.
pub trait BinaryClassifier {
    /// Fit the model on a cohort, recording its feature schema.
    fn fit(&mut self, cohort: &Cohort) -> anyhow::Result<()>;

    /// Probability of the patient class for every row of `x`.
    ///
    /// Fails with `CapabilityError` when the model cannot answer a
    /// probability query (never fitted, or fitted without calibration).
    fn predict_positive_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, EnsembleError>;

    fn kind(&self) -> ModelKind;

    /// Feature schema the model was trained on, if fitted.
    fn feature_schema(&self) -> Option<&[String]>;

    /// Human readable name for the model.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
