//! Integration tests for evaluation metrics and config types.

use cohort_classifiers::config::{ModelConfig, ModelKind, ModelType};
use cohort_classifiers::stats::{accuracy, cohen_kappa, roc_auc};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[test]
fn accuracy_counts_matches() {
    let predicted = vec![2, 1, 2, 1];
    let truth = vec![2, 1, 1, 1];
    assert!((accuracy(&predicted, &truth) - 0.75).abs() < 1e-12);
}

#[test]
#[should_panic(expected = "equal lengths")]
fn accuracy_mismatched_lengths_panics() {
    let _ = accuracy(&[1, 2], &[1]);
}

#[test]
fn kappa_perfect_agreement_is_one() {
    let labels = vec![2, 1, 2, 2, 1, 1];
    assert!((cohen_kappa(&labels, &labels) - 1.0).abs() < 1e-12);
}

#[test]
fn kappa_chance_level_is_zero() {
    // Predictions independent of truth, balanced classes: kappa ~ 0.
    let predicted = vec![2, 2, 1, 1];
    let truth = vec![2, 1, 2, 1];
    assert!(cohen_kappa(&predicted, &truth).abs() < 1e-12);
}

#[test]
fn kappa_known_value() {
    // Confusion matrix: [[20, 5], [10, 15]] over 50 samples.
    let mut predicted = Vec::new();
    let mut truth = Vec::new();
    for (p, t, count) in [(2, 2, 20), (2, 1, 5), (1, 2, 10), (1, 1, 15)] {
        for _ in 0..count {
            predicted.push(p);
            truth.push(t);
        }
    }
    // po = 0.7, pe = 0.5 -> kappa = 0.4
    assert!((cohen_kappa(&predicted, &truth) - 0.4).abs() < 1e-12);
}

#[test]
fn auc_perfect_ranking_is_one() {
    let scores = vec![0.9, 0.8, 0.2, 0.1];
    let positive = vec![true, true, false, false];
    assert!((roc_auc(&scores, &positive) - 1.0).abs() < 1e-12);
}

#[test]
fn auc_reversed_ranking_is_zero() {
    let scores = vec![0.1, 0.2, 0.8, 0.9];
    let positive = vec![true, true, false, false];
    assert!(roc_auc(&scores, &positive).abs() < 1e-12);
}

#[test]
fn auc_with_ties_uses_midranks() {
    // One positive tied with one negative: that pair contributes 0.5.
    let scores = vec![0.9, 0.5, 0.5, 0.1];
    let positive = vec![true, true, false, false];
    // Pairs: (0.9 vs 0.5) = 1, (0.9 vs 0.1) = 1, (0.5 vs 0.5) = 0.5,
    // (0.5 vs 0.1) = 1 -> 3.5 / 4 = 0.875
    assert!((roc_auc(&scores, &positive) - 0.875).abs() < 1e-12);
}

#[test]
#[should_panic(expected = "both classes")]
fn auc_single_class_panics() {
    let _ = roc_auc(&[0.1, 0.9], &[true, true]);
}

// ---------------------------------------------------------------------------
// Config / ModelType
// ---------------------------------------------------------------------------

#[test]
fn model_kind_parsing_accepts_aliases() {
    assert_eq!(
        "logistic".parse::<ModelKind>().unwrap(),
        ModelKind::LogisticRegression
    );
    assert_eq!("rf".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
    assert_eq!(
        "SVM".parse::<ModelKind>().unwrap(),
        ModelKind::SupportVectorMachine
    );
    assert_eq!(
        "treebag".parse::<ModelKind>().unwrap(),
        ModelKind::BaggedTrees
    );
}

#[test]
fn model_type_from_str_carries_defaults() {
    let model_type: ModelType = "random_forest".parse().unwrap();
    assert_eq!(model_type.kind(), ModelKind::RandomForest);
    match model_type {
        ModelType::RandomForest { n_trees, .. } => assert!(n_trees > 0),
        other => panic!("expected random forest defaults, got {:?}", other),
    }
}

#[test]
fn default_config_is_logistic() {
    let config = ModelConfig::default();
    assert_eq!(config.kind(), ModelKind::LogisticRegression);
}

#[test]
fn config_seed_and_kind_are_preserved() {
    let config = ModelConfig::new(7, ModelType::defaults_for(ModelKind::BaggedTrees));
    assert_eq!(config.seed, 7);
    assert_eq!(config.kind(), ModelKind::BaggedTrees);
}
