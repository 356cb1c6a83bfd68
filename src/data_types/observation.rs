
use crate::data_types::text_matrix::TextMatrix;

/// Number of non-data rows at the top of the source table (names and levels)
pub const HEADER_ROWS: usize = 2;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DimensionError {
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("derived stage count {stage_number} from {row_number} rows must be >= 1")]
    NonPositiveStages { row_number: usize, stage_number: i64 },
    #[error("derived gene count {gene_number} from {column_number} columns and {row_number} rows must be >= 1")]
    NonPositiveGenes { row_number: usize, column_number: usize, gene_number: i64 },
    #[error("{stage_number} stages and {gene_number} genes do not fit a {row_number}x{column_number} matrix")]
    OutOfBounds { stage_number: usize, gene_number: usize, row_number: usize, column_number: usize },
}

/// The parsed time-course table.
/// Rows are 2 header rows followed by one row per stage.
/// Columns are one index column per stage followed by one column per gene.
#[derive(Clone, Debug)]
pub struct ObservationMatrix {
    /// All cells, including the header rows
    cells: TextMatrix,
    /// Number of data rows
    stage_number: usize,
    /// Number of gene expression columns
    gene_number: usize
}

impl ObservationMatrix {
    /// Derives the stage and gene counts from the table shape.
    /// # Arguments
    /// * `cells` - the full table, header rows included
    /// # Errors
    /// * if the derived stage count or gene count is less than 1
    pub fn new(cells: TextMatrix) -> Result<Self, DimensionError> {
        let row_number = cells.num_rows();
        let column_number = cells.num_columns();

        let stage_number = row_number as i64 - HEADER_ROWS as i64;
        if stage_number < 1 {
            return Err(DimensionError::NonPositiveStages { row_number, stage_number });
        }

        let gene_number = column_number as i64 - row_number as i64 + HEADER_ROWS as i64;
        if gene_number < 1 {
            return Err(DimensionError::NonPositiveGenes { row_number, column_number, gene_number });
        }

        Ok(Self {
            cells,
            stage_number: stage_number as usize,
            gene_number: gene_number as usize
        })
    }

    pub fn cells(&self) -> &TextMatrix {
        &self.cells
    }

    pub fn row_number(&self) -> usize {
        self.cells.num_rows()
    }

    pub fn column_number(&self) -> usize {
        self.cells.num_columns()
    }

    pub fn stage_number(&self) -> usize {
        self.stage_number
    }

    pub fn gene_number(&self) -> usize {
        self.gene_number
    }

    /// The gene names, taken from the tail of the first header row
    pub fn gene_names(&self) -> Vec<String> {
        let header = &self.cells.rows()[0];
        header[header.len() - self.gene_number..].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_cells(num_rows: usize, num_columns: usize) -> TextMatrix {
        let rows = (0..num_rows)
            .map(|r| (0..num_columns).map(|c| format!("{r}.{c}")).collect())
            .collect();
        TextMatrix::new(rows).unwrap()
    }

    #[test]
    fn test_dimensions() {
        // 3 stages, 2 genes => 5 rows and 5 columns
        let observation = ObservationMatrix::new(build_cells(5, 5)).unwrap();
        assert_eq!(observation.stage_number(), 3);
        assert_eq!(observation.gene_number(), 2);
        assert_eq!(observation.gene_names(), vec!["0.3".to_string(), "0.4".to_string()]);
    }

    #[test]
    fn test_too_few_rows() {
        let result = ObservationMatrix::new(build_cells(2, 4));
        assert_eq!(result.unwrap_err(), DimensionError::NonPositiveStages { row_number: 2, stage_number: 0 });
    }

    #[test]
    fn test_too_few_columns() {
        let result = ObservationMatrix::new(build_cells(5, 3));
        assert_eq!(result.unwrap_err(), DimensionError::NonPositiveGenes { row_number: 5, column_number: 3, gene_number: 0 });
    }
}
