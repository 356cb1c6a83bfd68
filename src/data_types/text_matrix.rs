
use std::io::Write;

use crate::data_types::observation::DimensionError;

/// Value written into knocked-out cells
pub const KNOCKOUT_VALUE: &str = "0";

/// A rectangular grid of cells kept as text so header rows and values are written back verbatim.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextMatrix {
    /// Row-major cells, every row has the same length
    rows: Vec<Vec<String>>
}

impl TextMatrix {
    /// Wraps a set of rows.
    /// # Errors
    /// * if any row differs in length from the first row
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, DimensionError> {
        let expected = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_i, r)| r.len() != expected) {
            return Err(DimensionError::RaggedRow { row, expected, found: r.len() });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.as_str())
    }

    /// Overwrites `column` with the knock-out value for every row in `row_start..row_end`
    pub fn knock_out(&mut self, row_start: usize, row_end: usize, column: usize) {
        for row in self.rows[row_start..row_end].iter_mut() {
            row[column] = KNOCKOUT_VALUE.to_string();
        }
    }

    /// Returns a copy restricted to the columns from `start` onward
    pub fn column_slice(&self, start: usize) -> Self {
        let rows = self.rows.iter()
            .map(|r| r[start.min(r.len())..].to_vec())
            .collect();
        Self { rows }
    }

    /// Writes the rows tab-separated with no trailing newline after the final row
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writer.write_all(b"\n")?;
            }
            writer.write_all(row.join("\t").as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_ragged() {
        let result = TextMatrix::new(to_rows(&[&["a", "b"], &["1"]]));
        assert_eq!(result.unwrap_err(), DimensionError::RaggedRow { row: 1, expected: 2, found: 1 });
    }

    #[test]
    fn test_column_slice() {
        let matrix = TextMatrix::new(to_rows(&[&["a", "b", "c"], &["1", "2", "3"]])).unwrap();
        let sliced = matrix.column_slice(1);
        assert_eq!(sliced.rows(), to_rows(&[&["b", "c"], &["2", "3"]]).as_slice());
        assert_eq!(sliced.num_columns(), 2);
        assert_eq!(matrix.column_slice(5).num_columns(), 0);
    }

    #[test]
    fn test_write_tsv() {
        let mut matrix = TextMatrix::new(to_rows(&[&["a", "b"], &["1", "2"], &["3", "4"]])).unwrap();
        matrix.knock_out(1, 3, 1);
        let mut buffer: Vec<u8> = vec![];
        matrix.write_tsv(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "a\tb\n1\t0\n3\t0");
    }
}
