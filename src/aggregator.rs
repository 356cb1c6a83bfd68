/*!
# Divergence Aggregator
Scores every knock-out of one variant family against the baseline of that family.
Any missing or malformed knock-out aborts the whole family; the grid is never left with placeholder values.
*/
use log::{debug, info};
use std::collections::BTreeMap;

use crate::data_types::divergence_table::DivergenceTable;
use crate::data_types::observation::DimensionError;
use crate::data_types::probability_matrix::ProbabilityMatrix;
use crate::data_types::variant_id::{VariantFamily, VariantId};
use crate::data_types::work_layout::WorkLayout;
use crate::divergence::{jensen_shannon_divergence, DivergenceError};
use crate::parsing::probability::load_probability_matrix;
use crate::parsing::FormatError;
use crate::variant_generator::knockout_ids;

#[derive(thiserror::Error, Debug)]
pub enum AggregateError {
    #[error("no learner output for variant {variant}")]
    MissingVariant { variant: VariantId },
    #[error("failed to load learner output for variant {variant}")]
    Load { variant: VariantId, #[source] source: FormatError },
    #[error("failed to score variant {variant}")]
    Divergence { variant: VariantId, #[source] source: DivergenceError },
    #[error("expected {expected} gene names, found {found}")]
    GeneNames { expected: usize, found: usize },
    #[error("divergence grid does not match the gene names")]
    Grid(#[from] DimensionError),
}

impl AggregateError {
    /// The variant that caused the failure, if any
    pub fn variant(&self) -> Option<VariantId> {
        match self {
            AggregateError::MissingVariant { variant } |
            AggregateError::Load { variant, .. } |
            AggregateError::Divergence { variant, .. } => Some(*variant),
            AggregateError::GeneNames { .. } |
            AggregateError::Grid(_) => None
        }
    }
}

/// Flattens a matrix, tagging failures with the variant they came from
fn flatten_variant(matrix: &ProbabilityMatrix, variant: VariantId) -> Result<Vec<f64>, AggregateError> {
    matrix.flatten()
        .map_err(|source| AggregateError::Load { variant, source })
}

/// Computes the divergence of every knock-out from the baseline.
/// # Arguments
/// * `baseline` - the learner output for the unmodified input
/// * `knockouts` - the learner output for each `(gene, stage)` knock-out
/// * `gene_names` - one label per gene, in column order
/// * `gene_number` - number of genes
/// * `stage_number` - number of stages
/// # Errors
/// * if any knock-out in `[1, gene_number] x [1, stage_number]` is absent
/// * if any matrix still contains a missing cell, or the flattened lengths differ
pub fn aggregate(
    baseline: &ProbabilityMatrix,
    knockouts: &BTreeMap<VariantId, ProbabilityMatrix>,
    gene_names: &[String],
    gene_number: usize,
    stage_number: usize
) -> Result<DivergenceTable, AggregateError> {
    if gene_names.len() != gene_number {
        return Err(AggregateError::GeneNames { expected: gene_number, found: gene_names.len() });
    }

    let baseline_values = flatten_variant(baseline, VariantId::baseline())?;
    let mut grid: Vec<Vec<f64>> = vec![Vec::with_capacity(gene_number); stage_number];
    // stage outer here so each grid row is filled left to right
    for stage in 1..=stage_number {
        for gene in 1..=gene_number {
            let variant = VariantId::knockout(gene, stage);
            let matrix = knockouts.get(&variant)
                .ok_or(AggregateError::MissingVariant { variant })?;
            let values = flatten_variant(matrix, variant)?;
            let jsd = jensen_shannon_divergence(&baseline_values, &values)
                .map_err(|source| AggregateError::Divergence { variant, source })?;
            debug!("{variant} => {jsd}");
            grid[stage - 1].push(jsd);
        }
    }

    Ok(DivergenceTable::new(gene_names.to_vec(), grid)?)
}

/// Loads one learner result, distinguishing an absent file from an unreadable one
fn load_variant(layout: &WorkLayout, variant: VariantId, family: VariantFamily) -> Result<ProbabilityMatrix, AggregateError> {
    let path = layout.result_path(variant, family);
    if !path.exists() {
        return Err(AggregateError::MissingVariant { variant });
    }
    load_probability_matrix(&path)
        .map_err(|source| AggregateError::Load { variant, source })
}

/// Loads the learner outputs for one family from the work folder and scores them.
/// # Arguments
/// * `layout` - resolves the learner output path for each variant
/// * `family` - which input layout to score
/// * `gene_names` - one label per gene, in column order
/// * `stage_number` - number of stages
/// # Errors
/// * if the baseline or any knock-out output is absent or malformed
pub fn aggregate_family(
    layout: &WorkLayout,
    family: VariantFamily,
    gene_names: &[String],
    stage_number: usize
) -> Result<DivergenceTable, AggregateError> {
    let gene_number = gene_names.len();
    info!("Loading {family} learner outputs for {} knock-outs...", gene_number * stage_number);

    let baseline = load_variant(layout, VariantId::baseline(), family)?;
    let knockouts: BTreeMap<VariantId, ProbabilityMatrix> = knockout_ids(gene_number, stage_number)
        .map(|variant| {
            let matrix = load_variant(layout, variant, family)?;
            Ok((variant, matrix))
        })
        .collect::<Result<_, AggregateError>>()?;

    aggregate(&baseline, &knockouts, gene_names, gene_number, stage_number)
}
