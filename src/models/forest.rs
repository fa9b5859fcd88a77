use anyhow::{bail, Context};
use linfa::traits::Fit;
use linfa::Dataset as LinfaDataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::{ModelConfig, ModelKind, ModelType};
use crate::data_handling::Cohort;
use crate::error::EnsembleError;
use crate::models::bagging::{bootstrap_indices, positive_vote_fraction};
use crate::models::classifier_trait::BinaryClassifier;

/// Random forest: bagged decision trees with per-tree feature subsampling.
///
/// On top of bootstrap row resampling, every tree sees only a random subset
/// of the feature columns (the random-subspace variant). The per-class
/// probability of a row is the fraction of trees voting for that class.
pub struct RandomForestClassifier {
    trees: Vec<DecisionTree<f64, usize>>,
    feature_subsets: Vec<Vec<usize>>,
    schema: Option<Vec<String>>,
    config: ModelConfig,
}

impl RandomForestClassifier {
    pub fn new(config: ModelConfig) -> Self {
        RandomForestClassifier {
            trees: Vec::new(),
            feature_subsets: Vec::new(),
            schema: None,
            config,
        }
    }
}

impl BinaryClassifier for RandomForestClassifier {
    fn fit(&mut self, cohort: &Cohort) -> anyhow::Result<()> {
        let ModelType::RandomForest {
            n_trees,
            max_depth,
            feature_fraction,
        } = self.config.model_type
        else {
            bail!(
                "Expected random forest parameters, got {:?}",
                self.config.model_type
            );
        };
        if n_trees == 0 {
            bail!("Random forest needs at least one tree");
        }
        if !(0.0..=1.0).contains(&feature_fraction) || feature_fraction == 0.0 {
            bail!(
                "feature_fraction must lie in (0, 1], got {}",
                feature_fraction
            );
        }

        let targets = cohort.class_targets();
        let n = cohort.n_samples();
        let n_features = cohort.n_features();
        let subset_size =
            ((n_features as f64 * feature_fraction).round() as usize).clamp(1, n_features);
        let seed = self.config.seed;

        let fitted = (0..n_trees)
            .into_par_iter()
            .map(|t| -> anyhow::Result<(DecisionTree<f64, usize>, Vec<usize>)> {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let rows = bootstrap_indices(&mut rng, n, n);
                let mut columns =
                    rand::seq::index::sample(&mut rng, n_features, subset_size).into_vec();
                columns.sort_unstable();

                let records = cohort.x.select(Axis(0), &rows).select(Axis(1), &columns);
                let dataset = LinfaDataset::new(records, targets.select(Axis(0), &rows));
                let tree = DecisionTree::params()
                    .max_depth(Some(max_depth))
                    .split_quality(SplitQuality::Gini)
                    .fit(&dataset)
                    .with_context(|| format!("Forest tree {} fit failed", t))?;
                Ok((tree, columns))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::debug!(
            "Fitted random forest of {} trees over {} of {} features each",
            fitted.len(),
            subset_size,
            n_features
        );

        let (trees, feature_subsets): (Vec<_>, Vec<_>) = fitted.into_iter().unzip();
        self.trees = trees;
        self.feature_subsets = feature_subsets;
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
        Ok(positive_vote_fraction(
            &self.trees,
            Some(&self.feature_subsets),
            x,
        ))
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn feature_schema(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }
}
