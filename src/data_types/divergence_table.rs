
use serde::Serialize;

use crate::data_types::observation::DimensionError;
use crate::data_types::variant_id::VariantId;

/// One row of the flattened output, e.g. `("g1-2", 0.21)`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FlatRow {
    /// `<gene name>-<1-based stage>`
    pub label: String,
    /// Divergence of that knock-out from the baseline
    pub value: f64
}

/// Divergence of every knock-out from the baseline for one variant family.
/// Stored as a `stage_number x gene_number` grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DivergenceTable {
    /// Column labels for the grid
    gene_names: Vec<String>,
    /// `grid[stage - 1][gene - 1]`
    grid: Vec<Vec<f64>>
}

impl DivergenceTable {
    /// Constructor
    /// # Errors
    /// * if any grid row does not have exactly one value per gene name
    pub fn new(gene_names: Vec<String>, grid: Vec<Vec<f64>>) -> Result<Self, DimensionError> {
        if let Some((row, r)) = grid.iter().enumerate().find(|(_, r)| r.len() != gene_names.len()) {
            return Err(DimensionError::RaggedRow { row, expected: gene_names.len(), found: r.len() });
        }
        Ok(Self { gene_names, grid })
    }

    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    pub fn grid(&self) -> &[Vec<f64>] {
        &self.grid
    }

    pub fn stage_number(&self) -> usize {
        self.grid.len()
    }

    pub fn gene_number(&self) -> usize {
        self.gene_names.len()
    }

    /// Looks up the value for a knock-out, `None` for the baseline or anything out of range
    pub fn get(&self, variant: VariantId) -> Option<f64> {
        if variant.is_baseline() {
            return None;
        }
        self.grid.get(variant.stage().checked_sub(1)?)
            .and_then(|r| r.get(variant.gene().checked_sub(1)?))
            .copied()
    }

    /// Flattens the grid stage-major, so row `stage * gene_number + gene` (0-based) holds that pair
    pub fn flat_rows(&self) -> Vec<FlatRow> {
        self.grid.iter().enumerate()
            .flat_map(|(stage, row)| {
                row.iter().zip(self.gene_names.iter())
                    .map(move |(&value, gene_name)| FlatRow {
                        label: format!("{gene_name}-{}", stage + 1),
                        value
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_rows() {
        let table = DivergenceTable::new(
            vec!["g1".to_string(), "g2".to_string()],
            vec![vec![0.1, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]]
        ).unwrap();
        let flat = table.flat_rows();
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[0], FlatRow { label: "g1-1".to_string(), value: 0.1 });
        assert_eq!(flat[1], FlatRow { label: "g2-1".to_string(), value: 0.2 });
        // stage 2 (0-based 1), gene 1 (0-based 0) => row 1 * 2 + 0
        assert_eq!(flat[2], FlatRow { label: "g1-2".to_string(), value: 0.3 });
        assert_eq!(flat[5], FlatRow { label: "g2-3".to_string(), value: 0.6 });
    }

    #[test]
    fn test_get() {
        let table = DivergenceTable::new(
            vec!["g1".to_string(), "g2".to_string()],
            vec![vec![0.1, 0.2], vec![0.3, 0.4]]
        ).unwrap();
        assert_eq!(table.get(VariantId::knockout(2, 1)), Some(0.2));
        assert_eq!(table.get(VariantId::knockout(1, 2)), Some(0.3));
        assert_eq!(table.get(VariantId::baseline()), None);
        assert_eq!(table.get(VariantId::knockout(3, 1)), None);
    }

    #[test]
    fn test_ragged_grid() {
        let result = DivergenceTable::new(
            vec!["g1".to_string(), "g2".to_string()],
            vec![vec![0.1, 0.2], vec![0.3]]
        );
        assert_eq!(result, Err(DimensionError::RaggedRow { row: 1, expected: 2, found: 1 }));

        // no stages is still a valid table
        let empty = DivergenceTable::new(vec!["g1".to_string()], vec![]).unwrap();
        assert_eq!(empty.stage_number(), 0);
        assert!(empty.flat_rows().is_empty());
    }
}
