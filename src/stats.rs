//! Evaluation metrics for binary diagnosis predictions.
//!
//! Accuracy, ROC AUC and Cohen's kappa against the {1, 2} label coding,
//! plus an `EvaluationReport` bundling the three for downstream reporting.

use std::fmt;

use anyhow::{bail, Result};

use crate::data_handling::{Cohort, POSITIVE_LABEL};
use crate::ensemble::EnsembleResult;

/// Fraction of predictions matching the truth.
pub fn accuracy(predicted: &[i32], truth: &[i32]) -> f64 {
    assert_eq!(
        predicted.len(),
        truth.len(),
        "predictions and truth must have equal lengths"
    );
    assert!(!predicted.is_empty(), "accuracy of zero samples is undefined");

    let hits = predicted
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    hits as f64 / predicted.len() as f64
}

/// Cohen's kappa: chance-corrected agreement between predictions and truth.
///
/// Returns 0 when the expected agreement is already 1 (both sides constant
/// and equal), where the statistic is undefined.
pub fn cohen_kappa(predicted: &[i32], truth: &[i32]) -> f64 {
    assert_eq!(
        predicted.len(),
        truth.len(),
        "predictions and truth must have equal lengths"
    );
    assert!(!predicted.is_empty(), "kappa of zero samples is undefined");

    let n = predicted.len() as f64;
    let observed = accuracy(predicted, truth);

    let classes: std::collections::BTreeSet<i32> =
        predicted.iter().chain(truth).copied().collect();
    let mut expected = 0.0;
    for class in classes {
        let p_pred = predicted.iter().filter(|&&v| v == class).count() as f64 / n;
        let p_truth = truth.iter().filter(|&&v| v == class).count() as f64 / n;
        expected += p_pred * p_truth;
    }

    let denom = 1.0 - expected;
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    (observed - expected) / denom
}

/// Area under the ROC curve via the rank-sum statistic, with midranks for
/// tied scores.
pub fn roc_auc(scores: &[f64], positive: &[bool]) -> f64 {
    assert_eq!(
        scores.len(),
        positive.len(),
        "scores and truth must have equal lengths"
    );
    let n_pos = positive.iter().filter(|&&p| p).count();
    let n_neg = positive.len() - n_pos;
    assert!(
        n_pos > 0 && n_neg > 0,
        "ROC AUC requires both classes to be present"
    );

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Assign ranks 1..n, averaging within groups of tied scores.
    let mut ranks = vec![0.0f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = midrank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = ranks
        .iter()
        .zip(positive)
        .filter(|(_, &p)| p)
        .map(|(r, _)| r)
        .sum();
    let n_pos_f = n_pos as f64;
    (rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64)
}

/// Summary statistics for an ensemble scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub auc: f64,
    pub kappa: f64,
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "accuracy = {:.4}, AUC = {:.4}, kappa = {:.4}",
            self.accuracy, self.auc, self.kappa
        )
    }
}

/// Evaluate an ensemble result against the cohort's ground-truth labels.
pub fn evaluate(result: &EnsembleResult, cohort: &Cohort) -> Result<EvaluationReport> {
    if result.len() != cohort.n_samples() {
        bail!(
            "Result has {} rows but cohort has {}",
            result.len(),
            cohort.n_samples()
        );
    }

    let truth: Vec<i32> = cohort.y.to_vec();
    let positive: Vec<bool> = truth.iter().map(|&v| v == POSITIVE_LABEL).collect();

    let report = EvaluationReport {
        accuracy: accuracy(&result.labels, &truth),
        auc: roc_auc(&result.probabilities, &positive),
        kappa: cohen_kappa(&result.labels, &truth),
    };
    log::info!("Ensemble evaluation: {}", report);
    Ok(report)
}
