//! Preprocessing utilities shared by the analysis pipeline and models.
//!
//! Provides median imputation of missing cells, IQR-based outlier removal,
//! a per-column standard scaler with a fit/transform split so validation
//! data can reuse training statistics, a log transform, and PCA projection
//! via linfa-reduction.

use anyhow::{bail, Context, Result};
use linfa::traits::{Fit, Predict};
use linfa::Dataset as LinfaDataset;
use linfa_reduction::Pca;
use ndarray::{Array1, Array2};

use crate::data_handling::Cohort;

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-9;
}

/// Fit a `Scaler` from a feature matrix where rows are samples and columns
/// are features.
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    let (nrows, ncols) = x.dim();
    assert!(nrows > 0 && ncols > 0, "fit_scaler requires non-empty matrix");

    let nrows_f = nrows as f64;
    let mut mean = vec![0.0f64; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            mean[c] += x[(r, c)];
        }
    }
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut std = vec![0.0f64; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            let d = x[(r, c)] - mean[c];
            std[c] += d * d;
        }
    }
    for v in std.iter_mut() {
        *v = (*v / nrows_f).sqrt().max(Scaler::MIN_STD);
    }

    Scaler { mean, std }
}

/// Transform all rows using the provided `Scaler` and return a new matrix.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Array2<f64> {
    let (nrows, ncols) = x.dim();
    assert_eq!(ncols, sc.mean.len(), "scaler and matrix must have equal widths");

    let mut out = x.clone();
    for r in 0..nrows {
        for c in 0..ncols {
            out[(r, c)] = (x[(r, c)] - sc.mean[c]) / sc.std[c];
        }
    }
    out
}

/// Fit scaler and return the transformed matrix in one call.
pub fn fit_transform(x: &Array2<f64>) -> Array2<f64> {
    let sc = fit_scaler(x);
    transform_all(x, &sc)
}

/// Replace every NaN cell with the median of the finite values in its
/// column. A column with no finite values at all is filled with zero.
pub fn impute_median(cohort: &mut Cohort) {
    let (nrows, ncols) = cohort.x.dim();
    let mut imputed = 0usize;

    for c in 0..ncols {
        let mut finite: Vec<f64> = (0..nrows)
            .map(|r| cohort.x[(r, c)])
            .filter(|v| v.is_finite())
            .collect();
        if finite.len() == nrows {
            continue;
        }
        let fill = if finite.is_empty() {
            log::warn!(
                "Feature '{}' has no finite values, imputing zeros",
                cohort.feature_names[c]
            );
            0.0
        } else {
            finite.sort_by(|a, b| a.partial_cmp(b).unwrap());
            median_of_sorted(&finite)
        };
        for r in 0..nrows {
            if !cohort.x[(r, c)].is_finite() {
                cohort.x[(r, c)] = fill;
                imputed += 1;
            }
        }
    }

    if imputed > 0 {
        log::debug!("Imputed {} missing cells with column medians", imputed);
    }
}

/// Mask of rows to keep after Tukey-fence outlier screening: a row is
/// dropped when any of its features lies outside [q1 - k*iqr, q3 + k*iqr]
/// for that column. NaN cells never flag a row; impute first if needed.
pub fn iqr_inlier_mask(cohort: &Cohort, k: f64) -> Array1<bool> {
    let (nrows, ncols) = cohort.x.dim();
    let mut keep = Array1::from_elem(nrows, true);

    for c in 0..ncols {
        let mut finite: Vec<f64> = (0..nrows)
            .map(|r| cohort.x[(r, c)])
            .filter(|v| v.is_finite())
            .collect();
        if finite.is_empty() {
            continue;
        }
        finite.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let q1 = quantile_of_sorted(&finite, 0.25);
        let q3 = quantile_of_sorted(&finite, 0.75);
        let iqr = q3 - q1;
        let (lo, hi) = (q1 - k * iqr, q3 + k * iqr);

        for r in 0..nrows {
            let v = cohort.x[(r, c)];
            if v.is_finite() && (v < lo || v > hi) {
                keep[r] = false;
            }
        }
    }

    keep
}

/// Drop rows flagged by `iqr_inlier_mask`.
pub fn remove_outliers(cohort: &Cohort, k: f64) -> Cohort {
    let mask = iqr_inlier_mask(cohort, k);
    let dropped = mask.iter().filter(|&&m| !m).count();
    if dropped > 0 {
        log::info!("Removing {} outlier rows (Tukey fence k = {})", dropped, k);
    }
    cohort.filter(&mask)
}

/// Apply `ln(1 + x)` to every cell. Fails on values at or below -1, where
/// the transform is undefined.
pub fn log1p_transform(x: &Array2<f64>) -> Result<Array2<f64>> {
    if let Some(bad) = x.iter().find(|v| v.is_finite() && **v <= -1.0) {
        bail!("log1p transform is undefined for value {}", bad);
    }
    Ok(x.mapv(f64::ln_1p))
}

/// Project the cohort onto its first `n_components` principal components.
///
/// The returned cohort keeps the original labels; feature names become
/// "pc1".."pcN". Scale the features first, PCA is not scale-invariant.
pub fn pca_project(cohort: &Cohort, n_components: usize) -> Result<Cohort> {
    if n_components == 0 || n_components > cohort.n_features() {
        bail!(
            "Cannot project {} features onto {} components",
            cohort.n_features(),
            n_components
        );
    }

    let dataset = LinfaDataset::new(cohort.x.clone(), cohort.y.clone());
    let pca = Pca::params(n_components)
        .fit(&dataset)
        .context("PCA fit failed")?;
    let projected: Array2<f64> = pca.predict(&cohort.x);

    let feature_names = (1..=n_components).map(|i| format!("pc{}", i)).collect();
    Cohort::new(projected, cohort.y.clone(), feature_names)
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    quantile_of_sorted(sorted, 0.5)
}

/// Linear-interpolation quantile over an ascending slice.
fn quantile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let w = pos - lo as f64;
        sorted[lo] * (1.0 - w) + sorted[hi] * w
    }
}
