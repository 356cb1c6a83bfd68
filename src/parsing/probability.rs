
use log::trace;
use std::fs::File;
use std::path::Path;

use crate::data_types::probability_matrix::ProbabilityMatrix;
use crate::parsing::FormatError;

/// Parses a single cell, anything that is not a number is missing
fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
        .filter(|v| !v.is_nan())
}

/// Loads a tab-separated learner probability matrix.
/// The first row is a header and is discarded.
/// Rows that are entirely missing are removed, then columns that are entirely missing.
/// # Arguments
/// * `filename` - the learner output file
/// # Errors
/// * if the file is absent or cannot be parsed
/// * if the data rows are ragged
/// * if nothing numeric remains after cleaning
pub fn load_probability_matrix(filename: &Path) -> Result<ProbabilityMatrix, FormatError> {
    let file = File::open(filename)
        .map_err(|source| FormatError::Io { path: filename.to_path_buf(), source })?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true) // the header may be shorter than the data rows
        .comment(Some(b'#'))
        .from_reader(file);

    let mut rows: Vec<Vec<Option<f64>>> = vec![];
    for result in csv_reader.records() {
        let record = result.map_err(|source| FormatError::Csv { path: filename.to_path_buf(), source })?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    let matrix = ProbabilityMatrix::new(rows)
        .map_err(|source| FormatError::Shape { path: filename.to_path_buf(), source })?
        .drop_missing();
    if matrix.is_empty() {
        return Err(FormatError::NoNumericRows { path: filename.to_path_buf() });
    }
    trace!("Loaded {}x{} probability matrix from {filename:?}", matrix.num_rows(), matrix.num_columns());
    Ok(matrix)
}
