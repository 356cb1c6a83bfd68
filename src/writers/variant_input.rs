
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::data_types::text_matrix::TextMatrix;
use crate::data_types::work_layout::{BANLIST_FILENAME, INPUT_FILENAME, WHITELIST_FILENAME};

/// Prepares variant folders for the learner: the input matrix plus the shared filter lists
#[derive(Clone, Debug)]
pub struct VariantInputWriter {
    /// Edges the learner must not use, copied verbatim
    banlist: PathBuf,
    /// Edges the learner must keep, copied verbatim
    whitelist: PathBuf
}

impl VariantInputWriter {
    pub fn new(banlist: PathBuf, whitelist: PathBuf) -> Self {
        Self { banlist, whitelist }
    }

    /// Creates `variant_dir` if needed and fills it with the learner inputs.
    /// # Arguments
    /// * `variant_dir` - the folder for this variant
    /// * `matrix` - written tab-separated as `input.txt`, with no trailing newline
    /// # Errors
    /// * if the folder cannot be created or any file cannot be copied or written
    pub fn write_variant(&self, variant_dir: &Path, matrix: &TextMatrix) -> anyhow::Result<()> {
        std::fs::create_dir_all(variant_dir)
            .with_context(|| format!("Error while creating {variant_dir:?}:"))?;

        for (source, name) in [(&self.banlist, BANLIST_FILENAME), (&self.whitelist, WHITELIST_FILENAME)] {
            let target = variant_dir.join(name);
            std::fs::copy(source, &target)
                .with_context(|| format!("Error while copying {source:?} to {target:?}:"))?;
        }

        let input_fn = variant_dir.join(INPUT_FILENAME);
        let mut writer = BufWriter::new(
            File::create(&input_fn)
                .with_context(|| format!("Error while creating {input_fn:?}:"))?
        );
        matrix.write_tsv(&mut writer)
            .with_context(|| format!("Error while writing {input_fn:?}:"))?;
        writer.flush()
            .with_context(|| format!("Error while flushing output to {input_fn:?}:"))?;
        Ok(())
    }
}
