//! Data structures and helpers for clinical cohort datasets.
//!
//! This module defines `Cohort`, an ordered feature matrix with a named
//! feature schema and a parallel vector of binary diagnosis labels, and
//! contains helpers for filtering, feature selection, and train/test splits.
use anyhow::{bail, Result};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Label value for the positive ("patient") class.
pub const POSITIVE_LABEL: i32 = 2;
/// Label value for the negative ("control") class.
pub const NEGATIVE_LABEL: i32 = 1;

/// An ordered set of samples with a shared feature schema.
///
/// Rows of `x` correspond one-to-one to entries of `y`. Labels are only
/// consulted by training and evaluation code, never by the probability
/// averager itself.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub x: Array2<f64>,
    pub y: Array1<i32>,
    pub feature_names: Vec<String>,
}

impl Cohort {
    /// Build a cohort, validating that the shapes line up and that every
    /// label is one of the two diagnosis codes.
    pub fn new(x: Array2<f64>, y: Array1<i32>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            bail!(
                "Feature matrix has {} rows but {} labels were provided",
                x.nrows(),
                y.len()
            );
        }
        if x.ncols() != feature_names.len() {
            bail!(
                "Feature matrix has {} columns but {} feature names were provided",
                x.ncols(),
                feature_names.len()
            );
        }
        if let Some(bad) = y.iter().find(|&&v| v != POSITIVE_LABEL && v != NEGATIVE_LABEL) {
            bail!(
                "Labels must be {} (control) or {} (patient), found {}",
                NEGATIVE_LABEL,
                POSITIVE_LABEL,
                bad
            );
        }
        Ok(Cohort {
            x,
            y,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn schema(&self) -> &[String] {
        &self.feature_names
    }

    pub fn log_summary(&self) {
        let patients = self.y.iter().filter(|&&v| v == POSITIVE_LABEL).count();
        let controls = self.y.iter().filter(|&&v| v == NEGATIVE_LABEL).count();
        log::info!(
            "Cohort: {} patients and {} controls over {} features",
            patients,
            controls,
            self.n_features()
        );
    }

    /// Boolean targets, true for the patient class. Used by models whose
    /// underlying library expects binary targets.
    pub fn positive_targets(&self) -> Array1<bool> {
        self.y.mapv(|v| v == POSITIVE_LABEL)
    }

    /// Class targets encoded as 0 (control) / 1 (patient) for tree learners.
    pub fn class_targets(&self) -> Array1<usize> {
        self.y.mapv(|v| usize::from(v == POSITIVE_LABEL))
    }

    /// Column values for a named feature.
    pub fn feature_column(&self, name: &str) -> Option<Array1<f64>> {
        let idx = self.feature_names.iter().position(|n| n == name)?;
        Some(self.x.column(idx).to_owned())
    }

    /// Keep only rows where `mask[i]` is true.
    pub fn filter(&self, mask: &Array1<bool>) -> Cohort {
        assert_eq!(
            mask.len(),
            self.n_samples(),
            "mask and cohort must have equal lengths"
        );
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| if m { Some(i) } else { None })
            .collect();
        self.select_rows(&keep)
    }

    /// Keep only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Cohort {
        Cohort {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Keep only the given feature columns, in the given order.
    pub fn select_features(&self, indices: &[usize]) -> Cohort {
        Cohort {
            x: self.x.select(Axis(1), indices),
            y: self.y.clone(),
            feature_names: indices
                .iter()
                .map(|&i| self.feature_names[i].clone())
                .collect(),
        }
    }

    /// Shuffle rows with a seeded RNG and split into (train, validation).
    pub fn split(&self, train_fraction: f64, seed: u64) -> (Cohort, Cohort) {
        assert!(
            (0.0..=1.0).contains(&train_fraction),
            "train_fraction must lie in [0, 1]"
        );
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..self.n_samples()).collect();
        indices.shuffle(&mut rng);

        let n_train = (self.n_samples() as f64 * train_fraction).round() as usize;
        let (train_idx, valid_idx) = indices.split_at(n_train.min(indices.len()));

        (self.select_rows(train_idx), self.select_rows(valid_idx))
    }
}
