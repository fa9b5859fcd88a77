use std::error::Error;
use std::fmt;

use crate::config::ModelKind;

/// Custom error type for ensemble scoring failures.
///
/// Every variant is fatal to the scoring call: there is no retry and no
/// partial ensemble. The offending model's kind (and position, where it
/// helps) is carried so a failure can be diagnosed without re-running.
#[derive(Debug, Clone, PartialEq)]
pub enum EnsembleError {
    /// A kind identifier did not match any of the known model kinds.
    UnrecognizedModelKind(String),
    /// A model of a probability-capable kind cannot produce a probability,
    /// e.g. an SVM fitted without probability calibration or a model that
    /// was never fitted.
    CapabilityError { kind: ModelKind, reason: String },
    /// A model's recorded feature schema does not match the scored data.
    SchemaMismatch {
        kind: ModelKind,
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A model produced a probability outside [0, 1]. The value is surfaced
    /// rather than clamped.
    ProbabilityOutOfRange { kind: ModelKind, row: usize, value: f64 },
    /// `score` was called with no models.
    EmptyEnsemble,
    /// `score` was called with no rows to score.
    EmptyCohort,
}

impl fmt::Display for EnsembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnsembleError::UnrecognizedModelKind(kind) => {
                write!(f, "Unrecognized model kind: {}", kind)
            }
            EnsembleError::CapabilityError { kind, reason } => {
                write!(f, "{} cannot produce probabilities: {}", kind, reason)
            }
            EnsembleError::SchemaMismatch {
                kind,
                index,
                expected,
                found,
            } => write!(
                f,
                "Feature schema mismatch for {} (model #{}): model was trained on [{}] but data has [{}]",
                kind,
                index,
                expected.join(", "),
                found.join(", ")
            ),
            EnsembleError::ProbabilityOutOfRange { kind, row, value } => write!(
                f,
                "{} produced probability {} outside [0, 1] at row {}",
                kind, value, row
            ),
            EnsembleError::EmptyEnsemble => write!(f, "Ensemble contains no models"),
            EnsembleError::EmptyCohort => write!(f, "Cohort contains no rows to score"),
        }
    }
}

impl Error for EnsembleError {}
