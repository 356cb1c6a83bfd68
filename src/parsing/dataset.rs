
use log::debug;
use std::fs::File;
use std::path::Path;

use crate::data_types::observation::{DimensionError, ObservationMatrix};
use crate::data_types::text_matrix::TextMatrix;
use crate::parsing::FormatError;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Dimension(#[from] DimensionError),
}

/// Loads the source time-course table.
/// Every row is kept, including the two header rows, and cells are kept verbatim.
/// # Arguments
/// * `filename` - comma-separated input file
/// # Errors
/// * if the file cannot be opened or parsed, or has ragged rows
/// * if the derived stage or gene count is less than 1
pub fn load_dataset(filename: &Path) -> Result<ObservationMatrix, DatasetError> {
    let file = File::open(filename)
        .map_err(|source| FormatError::Io { path: filename.to_path_buf(), source })?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false) // the header rows are part of the matrix
        .flexible(true) // shape is checked below with a better error
        .from_reader(file);

    let mut rows: Vec<Vec<String>> = vec![];
    for result in csv_reader.records() {
        let record = result.map_err(|source| FormatError::Csv { path: filename.to_path_buf(), source })?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    if rows.is_empty() {
        return Err(FormatError::Empty { path: filename.to_path_buf() }.into());
    }
    debug!("Loaded {} rows from {filename:?}", rows.len());

    let cells = TextMatrix::new(rows)
        .map_err(|source| FormatError::Shape { path: filename.to_path_buf(), source })?;
    Ok(ObservationMatrix::new(cells)?)
}
