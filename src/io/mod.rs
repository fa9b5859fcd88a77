pub mod clinical_csv;

pub use clinical_csv::{read_cohort_csv, read_cohort_csv_with_config, CsvReaderConfig};
