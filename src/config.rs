use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnsembleError;

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ModelConfig {
    /// Seed for bootstrap resampling. Ignored by deterministic models.
    pub seed: u64,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    LogisticRegression {
        max_iterations: u64,
        gradient_tolerance: f64,
    },
    RandomForest {
        n_trees: usize,
        max_depth: usize,
        /// Fraction of features drawn (without replacement) per tree.
        feature_fraction: f64,
    },
    Svm {
        eps: f64,
        c: (f64, f64),
        kernel: String,
        gaussian_kernel_eps: f64,
        polynomial_kernel_constant: f64,
        polynomial_kernel_degree: f64,
        /// When false the model is fitted without Platt calibration and
        /// cannot answer probability queries.
        probability: bool,
    },
    BaggedTrees {
        n_estimators: usize,
        max_depth: usize,
        /// Bootstrap sample size as a fraction of the training rows.
        sample_fraction: f64,
    },
}

/// Closed set of model kinds known to the ensemble.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    SupportVectorMachine,
    BaggedTrees,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::RandomForest => "random_forest",
            ModelKind::SupportVectorMachine => "support_vector_machine",
            ModelKind::BaggedTrees => "bagged_trees",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic_regression" | "logistic" | "logreg" | "glm" => {
                Ok(ModelKind::LogisticRegression)
            }
            "random_forest" | "rf" => Ok(ModelKind::RandomForest),
            "support_vector_machine" | "svm" => Ok(ModelKind::SupportVectorMachine),
            "bagged_trees" | "bagged" | "bagging" | "treebag" => Ok(ModelKind::BaggedTrees),
            other => Err(EnsembleError::UnrecognizedModelKind(other.to_string())),
        }
    }
}

impl ModelType {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelType::LogisticRegression { .. } => ModelKind::LogisticRegression,
            ModelType::RandomForest { .. } => ModelKind::RandomForest,
            ModelType::Svm { .. } => ModelKind::SupportVectorMachine,
            ModelType::BaggedTrees { .. } => ModelKind::BaggedTrees,
        }
    }

    /// Default hyper-parameters for a given model kind.
    pub fn defaults_for(kind: ModelKind) -> Self {
        match kind {
            ModelKind::LogisticRegression => ModelType::LogisticRegression {
                max_iterations: 100,
                gradient_tolerance: 1e-4,
            },
            ModelKind::RandomForest => ModelType::RandomForest {
                n_trees: 500,
                max_depth: 16,
                feature_fraction: 0.5,
            },
            ModelKind::SupportVectorMachine => ModelType::Svm {
                eps: 0.1,
                c: (1.0, 1.0),
                kernel: "gauss".to_string(),
                gaussian_kernel_eps: 0.1,
                polynomial_kernel_constant: 1.0,
                polynomial_kernel_degree: 3.0,
                probability: true,
            },
            ModelKind::BaggedTrees => ModelType::BaggedTrees {
                n_estimators: 100,
                max_depth: 16,
                sample_fraction: 1.0,
            },
        }
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::defaults_for(ModelKind::LogisticRegression)
    }
}

impl FromStr for ModelType {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.parse::<ModelKind>()?;
        Ok(ModelType::defaults_for(kind))
    }
}

impl ModelConfig {
    pub fn new(seed: u64, model_type: ModelType) -> Self {
        Self { seed, model_type }
    }

    pub fn kind(&self) -> ModelKind {
        self.model_type.kind()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            model_type: ModelType::default(),
        }
    }
}
