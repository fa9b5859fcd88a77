use anyhow::{bail, Context};
use linfa::traits::{Fit, Predict};
use linfa::Dataset as LinfaDataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::{ModelConfig, ModelKind, ModelType};
use crate::data_handling::Cohort;
use crate::error::EnsembleError;
use crate::models::classifier_trait::BinaryClassifier;

/// Bootstrap-aggregated decision trees.
///
/// Each tree is fitted on a bootstrap resample of the training rows; the
/// positive-class probability of a row is the fraction of trees voting for
/// the patient class. Per-tree RNGs are derived from the configured seed so
/// repeated fits are reproducible even with parallel tree construction.
pub struct BaggedTreesClassifier {
    trees: Vec<DecisionTree<f64, usize>>,
    schema: Option<Vec<String>>,
    config: ModelConfig,
}

impl BaggedTreesClassifier {
    pub fn new(config: ModelConfig) -> Self {
        BaggedTreesClassifier {
            trees: Vec::new(),
            schema: None,
            config,
        }
    }
}

impl BinaryClassifier for BaggedTreesClassifier {
    fn fit(&mut self, cohort: &Cohort) -> anyhow::Result<()> {
        let ModelType::BaggedTrees {
            n_estimators,
            max_depth,
            sample_fraction,
        } = self.config.model_type
        else {
            bail!(
                "Expected bagged trees parameters, got {:?}",
                self.config.model_type
            );
        };
        if n_estimators == 0 {
            bail!("Bagged trees need at least one estimator");
        }
        if !(0.0..=1.0).contains(&sample_fraction) || sample_fraction == 0.0 {
            bail!("sample_fraction must lie in (0, 1], got {}", sample_fraction);
        }

        let targets = cohort.class_targets();
        let n = cohort.n_samples();
        let sample_size = ((n as f64 * sample_fraction).round() as usize).clamp(1, n);
        let seed = self.config.seed;

        let trees = (0..n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let indices = bootstrap_indices(&mut rng, n, sample_size);
                let dataset = LinfaDataset::new(
                    cohort.x.select(Axis(0), &indices),
                    targets.select(Axis(0), &indices),
                );
                DecisionTree::params()
                    .max_depth(Some(max_depth))
                    .split_quality(SplitQuality::Gini)
                    .fit(&dataset)
                    .with_context(|| format!("Decision tree {} fit failed", t))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::debug!(
            "Fitted {} bagged trees on {} of {} rows each",
            trees.len(),
            sample_size,
            n
        );

        self.trees = trees;
        self.schema = Some(cohort.schema().to_vec());
        Ok(())
    }

    fn predict_positive_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, EnsembleError> {
        if self.trees.is_empty() {
            return Err(EnsembleError::CapabilityError {
                kind: self.kind(),
                reason: "model has not been fitted".to_string(),
            });
        }
        Ok(positive_vote_fraction(&self.trees, None, x))
    }

    fn kind(&self) -> ModelKind {
        ModelKind::BaggedTrees
    }

    fn feature_schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }
}

/// Draw `size` row indices with replacement.
pub(crate) fn bootstrap_indices(rng: &mut StdRng, n: usize, size: usize) -> Vec<usize> {
    (0..size).map(|_| rng.gen_range(0..n)).collect()
}

/// Fraction of trees predicting the patient class per row. When
/// `feature_subsets` is given, tree `t` is evaluated on the column subset it
/// was trained with.
pub(crate) fn positive_vote_fraction(
    trees: &[DecisionTree<f64, usize>],
    feature_subsets: Option<&[Vec<usize>]>,
    x: &Array2<f64>,
) -> Vec<f64> {
    let mut votes = vec![0.0f64; x.nrows()];
    for (t, tree) in trees.iter().enumerate() {
        let predicted = match feature_subsets {
            Some(subsets) => tree.predict(&x.select(Axis(1), &subsets[t])),
            None => tree.predict(x),
        };
        for (row, &label) in predicted.iter().enumerate() {
            if label == 1 {
                votes[row] += 1.0;
            }
        }
    }
    let n_trees = trees.len() as f64;
    votes.iter().map(|v| v / n_trees).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    #[test]
    fn test_bagged_trees_classifier() {
        // Second feature is perfectly aligned with the diagnosis.
        let x = Array2::from_shape_vec(
            (10, 3),
            vec![
                0.1, 1.0, 0.2, //
                0.4, -1.0, 0.8, //
                0.6, 1.0, 1.2, //
                0.9, -1.0, 1.8, //
                1.2, 1.0, 2.4, //
                1.5, -1.0, 3.0, //
                1.8, 1.0, 3.6, //
                2.1, -1.0, 4.2, //
                2.4, 1.0, 4.8, //
                2.7, -1.0, 5.4, //
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![2, 1, 2, 1, 2, 1, 2, 1, 2, 1]);
        let cohort = Cohort::new(
            x,
            y,
            vec!["a".to_string(), "signal".to_string(), "c".to_string()],
        )
        .unwrap();

        let config = ModelConfig::new(
            7,
            ModelType::BaggedTrees {
                n_estimators: 20,
                max_depth: 4,
                sample_fraction: 1.0,
            },
        );
        let mut classifier = BaggedTreesClassifier::new(config);
        classifier.fit(&cohort).unwrap();

        let probs = classifier.predict_positive_proba(&cohort.x).unwrap();
        assert_eq!(probs.len(), cohort.n_samples());
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        // Patients should get clearly higher vote fractions than controls.
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn unfitted_model_cannot_answer_probability_queries() {
        let config = ModelConfig::new(0, ModelType::defaults_for(ModelKind::BaggedTrees));
        let classifier = BaggedTreesClassifier::new(config);
        let x = Array2::zeros((1, 2));
        assert!(matches!(
            classifier.predict_positive_proba(&x),
            Err(EnsembleError::CapabilityError { .. })
        ));
    }
}
