//! cohort-classifiers: binary classification helpers for clinical cohort studies.
//!
//! This crate provides lightweight model wrappers (logistic regression, SVM,
//! bagged trees and a random forest built on the linfa family), data handling
//! and preprocessing utilities, univariate feature selection, a probability
//! averaging ensemble, and evaluation metrics (accuracy, ROC AUC, Cohen's
//! kappa) used by higher-level analysis tooling.
//!
//! The design favors small, testable modules. All numerical fitting is
//! delegated to linfa routines; the crate's own logic is limited to data
//! plumbing, the ensemble combination rule, and reporting.
pub mod config;
pub mod data_handling;
pub mod ensemble;
pub mod error;
pub mod feature_selection;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod stats;
