//! Integration tests for cohort data handling and the CSV reader.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use cohort_classifiers::data_handling::Cohort;
use cohort_classifiers::io::{read_cohort_csv_with_config, CsvReaderConfig};
use ndarray::{Array1, Array2};

fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn cohort_validates_shapes_and_labels() {
    let x = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();

    // Label count mismatch
    assert!(Cohort::new(
        x.clone(),
        Array1::from_vec(vec![1]),
        vec!["a".into(), "b".into()]
    )
    .is_err());

    // Schema width mismatch
    assert!(Cohort::new(x.clone(), Array1::from_vec(vec![1, 2]), vec!["a".into()]).is_err());

    // Label outside the diagnosis codes
    assert!(Cohort::new(
        x.clone(),
        Array1::from_vec(vec![1, 3]),
        vec!["a".into(), "b".into()]
    )
    .is_err());

    let cohort = Cohort::new(x, Array1::from_vec(vec![1, 2]), vec!["a".into(), "b".into()])
        .unwrap();
    assert_eq!(cohort.n_samples(), 2);
    assert_eq!(cohort.n_features(), 2);
}

#[test]
fn filter_and_select_preserve_row_alignment() {
    let x = Array2::from_shape_vec((4, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
    let y = Array1::from_vec(vec![2, 1, 2, 1]);
    let cohort = Cohort::new(x, y, vec!["a".into(), "b".into()]).unwrap();

    let mask = Array1::from_vec(vec![true, false, true, false]);
    let patients = cohort.filter(&mask);
    assert_eq!(patients.n_samples(), 2);
    assert_eq!(patients.y.to_vec(), vec![2, 2]);
    assert!((patients.x[(1, 0)] - 5.0).abs() < 1e-12);

    let narrowed = cohort.select_features(&[1]);
    assert_eq!(narrowed.schema(), ["b".to_string()]);
    assert!((narrowed.x[(0, 0)] - 2.0).abs() < 1e-12);
    assert_eq!(narrowed.y, cohort.y);
}

#[test]
fn feature_column_lookup_by_name() {
    let x = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let cohort = Cohort::new(
        x,
        Array1::from_vec(vec![1, 2]),
        vec!["age".into(), "albumin".into()],
    )
    .unwrap();

    let col = cohort.feature_column("albumin").unwrap();
    assert_eq!(col.to_vec(), vec![2.0, 4.0]);
    assert!(cohort.feature_column("bilirubin").is_none());
}

#[test]
fn split_is_seeded_and_partitions_rows() {
    let x = Array2::from_shape_fn((20, 1), |(r, _)| r as f64);
    let y = Array1::from_vec((0..20).map(|i| if i < 10 { 1 } else { 2 }).collect());
    let cohort = Cohort::new(x, y, vec!["f0".into()]).unwrap();

    let (train_a, valid_a) = cohort.split(0.75, 99);
    let (train_b, valid_b) = cohort.split(0.75, 99);

    assert_eq!(train_a.n_samples(), 15);
    assert_eq!(valid_a.n_samples(), 5);
    assert_eq!(train_a.x, train_b.x, "same seed must give the same split");
    assert_eq!(valid_a.x, valid_b.x);

    let mut all: Vec<i64> = train_a
        .x
        .column(0)
        .iter()
        .chain(valid_a.x.column(0).iter())
        .map(|&v| v as i64)
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..20).collect::<Vec<i64>>());
}

#[test]
fn csv_reader_parses_features_labels_and_missing_cells() {
    let path = write_temp_csv(
        "cohort_classifiers_io_test.csv",
        "id,age,albumin,class\n\
         p01,52,3.4,2\n\
         p02,61,NA,1\n\
         p03,47,4.1,2\n",
    );

    let config = CsvReaderConfig::default();
    let cohort = read_cohort_csv_with_config(&path, &config).unwrap();

    assert_eq!(cohort.n_samples(), 3);
    assert_eq!(cohort.schema(), ["age".to_string(), "albumin".to_string()]);
    assert_eq!(cohort.y.to_vec(), vec![2, 1, 2]);
    assert!((cohort.x[(0, 0)] - 52.0).abs() < 1e-12);
    assert!(cohort.x[(1, 1)].is_nan(), "NA must parse as NaN");

    std::fs::remove_file(path).ok();
}

#[test]
fn csv_reader_rejects_bad_labels_and_missing_columns() {
    let bad_label = write_temp_csv(
        "cohort_classifiers_io_bad_label.csv",
        "age,class\n50,3\n",
    );
    assert!(read_cohort_csv_with_config(&bad_label, &CsvReaderConfig::default()).is_err());
    std::fs::remove_file(bad_label).ok();

    let no_label = write_temp_csv("cohort_classifiers_io_no_label.csv", "age,sex\n50,1\n");
    assert!(read_cohort_csv_with_config(&no_label, &CsvReaderConfig::default()).is_err());
    std::fs::remove_file(no_label).ok();
}
