//! Univariate feature selection following scikit-learn's API.
//!
//! See: https://scikit-learn.org/stable/modules/feature_selection.html#univariate-feature-selection

use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::data_handling::{Cohort, POSITIVE_LABEL};

/// One-way ANOVA F-test between the patient and control groups,
/// computed per feature.
///
/// With two groups the between-group degrees of freedom is 1 and the
/// within-group degrees of freedom is `n - 2`. Larger F means the feature
/// separates the two diagnosis groups better.
///
/// # Parameters
///
/// * `x` - Feature matrix of shape (n_samples, n_features).
/// * `y` - Diagnosis labels, one per row.
/// * `force_finite` - Replace non-finite statistics: an infinite F (a
///   feature that is constant within each group but differs between them)
///   becomes `f64::MAX` with p-value 0, a NaN F (a feature constant
///   everywhere) becomes 0 with p-value 1.
///
/// # Returns
///
/// A tuple of per-feature F-statistics and their p-values.
pub fn f_classif(
    x: &Array2<f64>,
    y: &Array1<i32>,
    force_finite: bool,
) -> (Array1<f64>, Array1<f64>) {
    let n_samples = x.nrows();
    let n_features = x.ncols();
    assert_eq!(
        n_samples,
        y.len(),
        "features and labels must have equal lengths"
    );
    assert!(n_samples > 2, "F-test needs more than two samples");

    let positive: Vec<bool> = y.iter().map(|&v| v == POSITIVE_LABEL).collect();
    let n_pos = positive.iter().filter(|&&p| p).count();
    let n_neg = n_samples - n_pos;
    assert!(
        n_pos > 0 && n_neg > 0,
        "F-test needs samples from both diagnosis groups"
    );

    let deg_of_freedom = (n_samples - 2) as f64;
    let f_dist = FisherSnedecor::new(1.0, deg_of_freedom)
        .expect("F-distribution parameters are positive by construction");

    let mut f_statistic = Array1::zeros(n_features);
    let mut p_values = Array1::zeros(n_features);

    for (i, col) in x.columns().into_iter().enumerate() {
        let mut sum_pos = 0.0;
        let mut sum_neg = 0.0;
        for (v, &is_pos) in col.iter().zip(&positive) {
            if is_pos {
                sum_pos += v;
            } else {
                sum_neg += v;
            }
        }
        let mean_pos = sum_pos / n_pos as f64;
        let mean_neg = sum_neg / n_neg as f64;
        let grand_mean = (sum_pos + sum_neg) / n_samples as f64;

        let ss_between = n_pos as f64 * (mean_pos - grand_mean).powi(2)
            + n_neg as f64 * (mean_neg - grand_mean).powi(2);
        let mut ss_within = 0.0;
        for (v, &is_pos) in col.iter().zip(&positive) {
            let group_mean = if is_pos { mean_pos } else { mean_neg };
            ss_within += (v - group_mean).powi(2);
        }

        let f = ss_between / (ss_within / deg_of_freedom);
        f_statistic[i] = f;
        p_values[i] = if f.is_finite() { 1.0 - f_dist.cdf(f) } else { 0.0 };
    }

    if force_finite {
        for i in 0..n_features {
            if !f_statistic[i].is_finite() {
                if f_statistic[i].is_infinite() {
                    f_statistic[i] = f64::MAX;
                    p_values[i] = 0.0;
                } else {
                    f_statistic[i] = 0.0;
                    p_values[i] = 1.0;
                }
            }
        }
    }

    (f_statistic, p_values)
}

/// Select the k best features by ANOVA F-score.
pub struct SelectKBest {
    k: usize,
}

impl SelectKBest {
    pub fn new(k: usize) -> Self {
        SelectKBest { k }
    }

    /// Rank features on the cohort and return the indices of the k best,
    /// highest score first.
    pub fn fit(&self, cohort: &Cohort) -> Vec<usize> {
        let (f_scores, _) = f_classif(&cohort.x, &cohort.y, true);

        let mut indices: Vec<usize> = (0..f_scores.len()).collect();
        indices.sort_by(|&i, &j| {
            f_scores[i]
                .partial_cmp(&f_scores[j])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        indices.iter().rev().take(self.k).cloned().collect()
    }
}
