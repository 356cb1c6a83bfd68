/*!
# Parsing module
Readers for the source time-course table and the learner's probability matrices.
*/
/// Reads the source time-course CSV into an observation matrix
pub mod dataset;
/// Reads and cleans learner probability matrices
pub mod probability;

use std::path::PathBuf;

use crate::data_types::observation::DimensionError;

/// Failures while turning a file into a matrix
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to open {path:?}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse {path:?}")]
    Csv { path: PathBuf, #[source] source: csv::Error },
    #[error("{path:?} contains no rows")]
    Empty { path: PathBuf },
    #[error("{path:?} contains no numeric rows")]
    NoNumericRows { path: PathBuf },
    #[error("{path:?} has an invalid shape")]
    Shape { path: PathBuf, #[source] source: DimensionError },
    #[error("missing value at row {row}, column {column}")]
    MissingCell { row: usize, column: usize },
}
