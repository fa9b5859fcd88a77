//! CSV reader for clinical cohort tables.
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array1, Array2};

use crate::data_handling::{Cohort, NEGATIVE_LABEL, POSITIVE_LABEL};

/// Configuration for reading a cohort CSV file.
#[derive(Debug, Clone)]
pub struct CsvReaderConfig {
    /// Column name holding diagnosis labels (1 / 2).
    pub label_column: String,
    /// Field delimiter.
    pub delimiter: u8,
    /// Cell values treated as missing and parsed as NaN.
    pub missing_tokens: Vec<String>,
    /// Columns skipped when selecting features (identifiers etc).
    pub ignore_columns: Vec<String>,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "class".to_string(),
            delimiter: b',',
            missing_tokens: vec![
                String::new(),
                "NA".to_string(),
                "na".to_string(),
                "?".to_string(),
            ],
            ignore_columns: vec!["id".to_string(), "patient_id".to_string()],
        }
    }
}

/// Read a cohort CSV file with the default configuration.
pub fn read_cohort_csv<P: AsRef<Path>>(path: P) -> Result<Cohort> {
    read_cohort_csv_with_config(path, &CsvReaderConfig::default())
}

/// Read a cohort CSV file using a custom configuration.
///
/// The header row supplies the feature schema. Every non-label, non-ignored
/// column is parsed as `f64`; missing tokens become NaN so downstream
/// imputation can deal with them. The label column must contain only the
/// two diagnosis codes.
pub fn read_cohort_csv_with_config<P: AsRef<Path>>(
    path: P,
    config: &CsvReaderConfig,
) -> Result<Cohort> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open cohort file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read cohort header row")?
        .clone();

    let label_idx = headers
        .iter()
        .position(|h| h == config.label_column)
        .ok_or_else(|| anyhow!("Label column '{}' not found in header", config.label_column))?;

    let feature_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != label_idx && !config.ignore_columns.iter().any(|c| c == h))
        .map(|(i, _)| i)
        .collect();
    let feature_names: Vec<String> = feature_indices
        .iter()
        .map(|&i| headers[i].to_string())
        .collect();

    let mut values: Vec<f64> = Vec::new();
    let mut labels: Vec<i32> = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read record {}", row))?;

        let raw_label = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Record {} is missing the label column", row))?;
        let label: i32 = raw_label
            .trim()
            .parse()
            .with_context(|| format!("Invalid label '{}' at record {}", raw_label, row))?;
        if label != POSITIVE_LABEL && label != NEGATIVE_LABEL {
            bail!(
                "Label must be {} or {}, found {} at record {}",
                NEGATIVE_LABEL,
                POSITIVE_LABEL,
                label,
                row
            );
        }
        labels.push(label);

        for &col in &feature_indices {
            let raw = record
                .get(col)
                .ok_or_else(|| anyhow!("Record {} is missing column {}", row, &headers[col]))?
                .trim();
            if config.missing_tokens.iter().any(|t| t == raw) {
                values.push(f64::NAN);
            } else {
                let value: f64 = raw.parse().with_context(|| {
                    format!("Invalid value '{}' for {} at record {}", raw, &headers[col], row)
                })?;
                values.push(value);
            }
        }
    }

    if labels.is_empty() {
        bail!("Cohort file {} contains no records", path.as_ref().display());
    }

    let x = Array2::from_shape_vec((labels.len(), feature_names.len()), values)
        .context("Cohort feature matrix has inconsistent row widths")?;
    let cohort = Cohort::new(x, Array1::from_vec(labels), feature_names)?;

    log::debug!(
        "Loaded {} samples with {} features from {}",
        cohort.n_samples(),
        cohort.n_features(),
        path.as_ref().display()
    );

    Ok(cohort)
}
