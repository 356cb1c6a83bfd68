
use anyhow::Context;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::data_types::divergence_table::DivergenceTable;
use crate::data_types::variant_id::VariantFamily;

/// Path of the gene-name-headered grid output
pub fn grid_output_path(output_folder: &Path, dataset_name: &str, family: VariantFamily) -> PathBuf {
    output_folder.join(format!("{dataset_name}_jsd_matrix{}.csv", family.suffix()))
}

/// Path of the `(label, value)` flat output
pub fn flat_output_path(output_folder: &Path, dataset_name: &str, family: VariantFamily) -> PathBuf {
    output_folder.join(format!("{dataset_name}_rearranged_jsd_matrix{}.csv", family.suffix()))
}

/// Writes the grid: a row of gene names, then one row of values per stage
pub fn write_divergence_grid(table: &DivergenceTable, filename: &Path) -> csv::Result<()> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true) // an empty table has a header row but no values
        .from_path(filename)?;
    csv_writer.write_record(table.gene_names())?;
    for row in table.grid().iter() {
        csv_writer.write_record(row.iter().map(|v| format!("{v:?}")))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the flattened `(label, value)` rows with no header
pub fn write_divergence_flat(table: &DivergenceTable, filename: &Path) -> csv::Result<()> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(filename)?;
    for row in table.flat_rows().iter() {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Temporary sibling of an output file, renamed into place once complete
fn staging_path(filename: &Path) -> PathBuf {
    let mut staged = filename.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

/// Best-effort cleanup, the original error is the one worth reporting
fn remove_quietly(filenames: &[&Path]) {
    for filename in filenames.iter() {
        let _ = std::fs::remove_file(filename);
    }
}

/// Writes both layouts for one family into the output folder.
/// Both files are staged next to their final names and only moved into place once both are written,
/// so a failure never leaves one layout without the other.
/// # Arguments
/// * `table` - the fully computed divergences
/// * `output_folder` - destination folder, must exist
/// * `dataset_name` - prefix for both files
/// * `family` - selects the file name suffix
/// # Errors
/// * if either file cannot be written or moved into place
pub fn write_family_outputs(table: &DivergenceTable, output_folder: &Path, dataset_name: &str, family: VariantFamily) -> anyhow::Result<(PathBuf, PathBuf)> {
    let grid_fn = grid_output_path(output_folder, dataset_name, family);
    let flat_fn = flat_output_path(output_folder, dataset_name, family);
    let grid_staged = staging_path(&grid_fn);
    let flat_staged = staging_path(&flat_fn);

    let staged = write_divergence_grid(table, &grid_staged)
        .with_context(|| format!("Error while writing {grid_staged:?}:"))
        .and_then(|_| {
            write_divergence_flat(table, &flat_staged)
                .with_context(|| format!("Error while writing {flat_staged:?}:"))
        });
    if let Err(e) = staged {
        remove_quietly(&[&grid_staged, &flat_staged]);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(&grid_staged, &grid_fn) {
        remove_quietly(&[&grid_staged, &flat_staged]);
        return Err(e).with_context(|| format!("Error while moving {grid_staged:?} to {grid_fn:?}:"));
    }
    if let Err(e) = std::fs::rename(&flat_staged, &flat_fn) {
        remove_quietly(&[&grid_fn, &flat_staged]);
        return Err(e).with_context(|| format!("Error while moving {flat_staged:?} to {flat_fn:?}:"));
    }
    info!("Jensen-Shannon divergence matrix written to {grid_fn:?}");
    info!("Rearranged Jensen-Shannon divergence matrix written to {flat_fn:?}");

    Ok((grid_fn, flat_fn))
}
