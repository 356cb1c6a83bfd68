
use crate::data_types::observation::DimensionError;
use crate::parsing::FormatError;

/// A numeric grid produced by the external learner.
/// Cells that did not parse as a number are kept as `None` so they can be told apart from zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbabilityMatrix {
    /// Row-major cells, every row has the same length
    rows: Vec<Vec<Option<f64>>>
}

impl ProbabilityMatrix {
    /// Wraps parsed rows.
    /// # Errors
    /// * if any row differs in length from the first row
    pub fn new(rows: Vec<Vec<Option<f64>>>) -> Result<Self, DimensionError> {
        let expected = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_i, r)| r.len() != expected) {
            return Err(DimensionError::RaggedRow { row, expected, found: r.len() });
        }
        Ok(Self { rows })
    }

    /// Builds a fully populated matrix, mostly useful for in-memory callers
    pub fn from_values(values: Vec<Vec<f64>>) -> Result<Self, DimensionError> {
        Self::new(
            values.into_iter()
                .map(|r| r.into_iter().map(Some).collect())
                .collect()
        )
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0 || self.num_columns() == 0
    }

    /// Removes every row that is entirely missing, then every column that is entirely missing in the remaining rows.
    pub fn drop_missing(self) -> Self {
        let rows: Vec<Vec<Option<f64>>> = self.rows.into_iter()
            .filter(|r| r.iter().any(|c| c.is_some()))
            .collect();

        let num_columns = rows.first().map(|r| r.len()).unwrap_or(0);
        let keep_columns: Vec<bool> = (0..num_columns)
            .map(|c| rows.iter().any(|r| r[c].is_some()))
            .collect();

        let rows = rows.into_iter()
            .map(|r| {
                r.into_iter()
                    .zip(keep_columns.iter())
                    .filter_map(|(cell, &keep)| if keep { Some(cell) } else { None })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Flattens the matrix row-major into plain values.
    /// # Errors
    /// * if any individual cell is still missing; these are never coerced to zero
    pub fn flatten(&self) -> Result<Vec<f64>, FormatError> {
        let mut values = Vec::with_capacity(self.num_rows() * self.num_columns());
        for (row, r) in self.rows.iter().enumerate() {
            for (column, cell) in r.iter().enumerate() {
                match cell {
                    Some(v) => values.push(*v),
                    None => return Err(FormatError::MissingCell { row, column })
                }
            }
        }
        Ok(values)
    }
}
