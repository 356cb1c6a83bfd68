/*!
# Variant Generator
Derives the knock-out inputs from one observation matrix.
A knock-out `(gene, stage)` zeroes that gene's expression column from `stage` through the last stage,
holding every other cell at its observed value.
Each variant is emitted twice: the full matrix and the genes-only slice without the stage columns.

## Example usage
```rust
use smile::data_types::observation::ObservationMatrix;
use smile::data_types::text_matrix::TextMatrix;
use smile::data_types::variant_id::VariantId;
use smile::variant_generator::generate_variants;

// 2 stages and 1 gene: names row, levels row, then one row per stage
let rows = vec![
    vec!["s1", "s2", "g1"],
    vec!["1", "1", "1"],
    vec!["1", "0", "0.4"],
    vec!["0", "1", "0.6"],
];
let rows: Vec<Vec<String>> = rows.into_iter()
    .map(|r| r.into_iter().map(String::from).collect())
    .collect();
let observation = ObservationMatrix::new(TextMatrix::new(rows).unwrap()).unwrap();

let variants = generate_variants(observation.cells(), observation.stage_number(), observation.gene_number()).unwrap();
assert_eq!(variants.len(), 3);
assert_eq!(variants[0].variant(), VariantId::baseline());

// gene 1 knocked out from stage 2 onward
let knockout = &variants[2];
assert_eq!(knockout.variant(), VariantId::knockout(1, 2));
assert_eq!(knockout.full().get(2, 2), Some("0.4"));
assert_eq!(knockout.full().get(3, 2), Some("0"));
assert_eq!(knockout.genes_only().get(3, 0), Some("0"));
```
*/
use itertools::iproduct;
use log::debug;

use crate::data_types::observation::{DimensionError, HEADER_ROWS};
use crate::data_types::text_matrix::TextMatrix;
use crate::data_types::variant_id::{VariantFamily, VariantId};

/// One generated variant in both of its layouts
#[derive(Clone, Debug)]
pub struct GeneratedVariant {
    /// Which gene/stage was knocked out, `(0, 0)` for the baseline
    variant: VariantId,
    /// The whole matrix with the knock-out applied
    full: TextMatrix,
    /// `full` restricted to the gene expression columns
    genes_only: TextMatrix
}

impl GeneratedVariant {
    pub fn variant(&self) -> VariantId {
        self.variant
    }

    pub fn full(&self) -> &TextMatrix {
        &self.full
    }

    pub fn genes_only(&self) -> &TextMatrix {
        &self.genes_only
    }

    /// The matrix for the requested family
    pub fn matrix(&self, family: VariantFamily) -> &TextMatrix {
        match family {
            VariantFamily::Full => &self.full,
            VariantFamily::GenesOnly => &self.genes_only
        }
    }
}

/// Enumerates every knock-out identity in output order: gene outer, stage inner, both 1-based.
pub fn knockout_ids(gene_number: usize, stage_number: usize) -> impl Iterator<Item = VariantId> {
    iproduct!(1..=gene_number, 1..=stage_number)
        .map(|(gene, stage)| VariantId::knockout(gene, stage))
}

/// The rows and column zeroed for a knock-out, as `(row_start, row_end, column)` with `row_end` exclusive
pub fn knockout_region(variant: VariantId, stage_number: usize) -> (usize, usize, usize) {
    (variant.stage() + 1, stage_number + HEADER_ROWS, variant.gene() + stage_number - 1)
}

/// Generates the baseline followed by every `(gene, stage)` knock-out.
/// Each variant is an independent copy; `matrix` is never modified.
/// With `gene_number == 0` or `stage_number == 0` only the baseline is produced.
/// # Arguments
/// * `matrix` - the full observation table, header rows included
/// * `stage_number` - number of stage rows (and leading stage columns)
/// * `gene_number` - number of trailing gene columns
/// # Errors
/// * if the dimensions do not fit inside `matrix`
pub fn generate_variants(matrix: &TextMatrix, stage_number: usize, gene_number: usize) -> Result<Vec<GeneratedVariant>, DimensionError> {
    let mut variants = Vec::with_capacity(gene_number * stage_number + 1);
    variants.push(GeneratedVariant {
        variant: VariantId::baseline(),
        full: matrix.clone(),
        genes_only: matrix.column_slice(stage_number)
    });

    if gene_number == 0 || stage_number == 0 {
        debug!("No genes or stages to knock out, only the baseline was generated");
        return Ok(variants);
    }

    if matrix.num_rows() < stage_number + HEADER_ROWS || matrix.num_columns() < stage_number + gene_number {
        return Err(DimensionError::OutOfBounds {
            stage_number, gene_number,
            row_number: matrix.num_rows(),
            column_number: matrix.num_columns()
        });
    }

    for variant in knockout_ids(gene_number, stage_number) {
        let (row_start, row_end, column) = knockout_region(variant, stage_number);
        let mut full = matrix.clone();
        full.knock_out(row_start, row_end, column);
        let genes_only = full.column_slice(stage_number);
        variants.push(GeneratedVariant {
            variant, full, genes_only
        });
    }

    debug!("Generated {} variants per family", variants.len());
    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::text_matrix::KNOCKOUT_VALUE;

    /// 3 stages and 2 genes with unique non-zero cells
    fn example_matrix() -> TextMatrix {
        let mut rows: Vec<Vec<String>> = vec![
            ["s1", "s2", "s3", "g1", "g2"].iter().map(|s| s.to_string()).collect(),
            vec!["1".to_string(); 5],
        ];
        for r in 2..5 {
            rows.push((0..5).map(|c| format!("{}.{c}", r + 1)).collect());
        }
        TextMatrix::new(rows).unwrap()
    }

    #[test]
    fn test_counts() {
        let matrix = example_matrix();
        let variants = generate_variants(&matrix, 3, 2).unwrap();
        assert_eq!(variants.len(), 2 * 3 + 1);
        assert_eq!(variants.iter().filter(|v| v.variant().is_baseline()).count(), 1);

        let ids: Vec<VariantId> = variants.iter().map(|v| v.variant()).collect();
        assert_eq!(ids, vec![
            VariantId::baseline(),
            VariantId::knockout(1, 1), VariantId::knockout(1, 2), VariantId::knockout(1, 3),
            VariantId::knockout(2, 1), VariantId::knockout(2, 2), VariantId::knockout(2, 3),
        ]);

        for v in variants.iter() {
            assert_eq!(v.genes_only().num_columns(), 2);
            assert_eq!(v.genes_only().num_rows(), 5);
            assert_eq!(v.genes_only(), &v.full().column_slice(3));
        }
    }

    #[test]
    fn test_baseline_is_copy() {
        let matrix = example_matrix();
        let variants = generate_variants(&matrix, 3, 2).unwrap();
        assert_eq!(variants[0].full(), &matrix);
        assert_eq!(variants[0].matrix(VariantFamily::GenesOnly), &matrix.column_slice(3));
    }

    #[test]
    fn test_zeroing_locality() {
        let matrix = example_matrix();
        let variants = generate_variants(&matrix, 3, 2).unwrap();
        for v in variants.iter().skip(1) {
            let (row_start, row_end, column) = knockout_region(v.variant(), 3);
            for r in 0..matrix.num_rows() {
                for c in 0..matrix.num_columns() {
                    let inside = r >= row_start && r < row_end && c == column;
                    if inside {
                        assert_eq!(v.full().get(r, c), Some(KNOCKOUT_VALUE));
                    } else {
                        assert_eq!(v.full().get(r, c), matrix.get(r, c));
                    }
                }
            }
        }

        // gene 2 from stage 2: rows 3 and 4 of column 4
        let knockout = &variants[5];
        assert_eq!(knockout.variant(), VariantId::knockout(2, 2));
        assert_eq!(knockout_region(knockout.variant(), 3), (3, 5, 4));
        assert_eq!(knockout.full().get(2, 4), Some("3.4"));
        assert_eq!(knockout.full().get(3, 4), Some("0"));
        assert_eq!(knockout.full().get(4, 4), Some("0"));
        assert_eq!(knockout.genes_only().get(4, 1), Some("0"));
        assert_eq!(knockout.genes_only().get(4, 0), Some("5.3"));
    }

    #[test]
    fn test_degenerate() {
        let matrix = example_matrix();
        assert_eq!(generate_variants(&matrix, 0, 2).unwrap().len(), 1);
        assert_eq!(generate_variants(&matrix, 3, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_bounds() {
        let matrix = example_matrix();
        let result = generate_variants(&matrix, 3, 4);
        assert_eq!(result.unwrap_err(), DimensionError::OutOfBounds {
            stage_number: 3, gene_number: 4, row_number: 5, column_number: 5
        });
    }
}
