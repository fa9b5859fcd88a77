use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::BinaryClassifier;

/// Build a boxed classifier model from a `ModelConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(config: ModelConfig) -> Box<dyn BinaryClassifier> {
    match config.model_type {
        ModelType::LogisticRegression { .. } => {
            Box::new(crate::models::logistic::LogisticRegressionClassifier::new(config))
        }
        ModelType::RandomForest { .. } => {
            Box::new(crate::models::forest::RandomForestClassifier::new(config))
        }
        ModelType::Svm { .. } => Box::new(crate::models::svm::SvmClassifier::new(config)),
        ModelType::BaggedTrees { .. } => {
            Box::new(crate::models::bagging::BaggedTreesClassifier::new(config))
        }
    }
}
