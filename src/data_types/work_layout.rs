
use std::path::{Path, PathBuf};

use crate::data_types::variant_id::{VariantFamily, VariantId};

/// The matrix handed to the learner inside each variant folder
pub const INPUT_FILENAME: &str = "input.txt";
/// Copied verbatim into each variant folder
pub const BANLIST_FILENAME: &str = "banlist.txt";
/// Copied verbatim into each variant folder
pub const WHITELIST_FILENAME: &str = "whitelist.txt";
/// What the learner writes into each variant folder
pub const RESULT_FILENAME: &str = "model_averaging_probabilities.txt";
/// Captured learner stdout/stderr
pub const LOG_FILENAME: &str = "run_BNW.log";

/// Resolves where every per-variant artifact lives under a work folder.
#[derive(Clone, Debug)]
pub struct WorkLayout {
    /// Root folder that holds the variant folders and the rendered run script
    work_folder: PathBuf,
    /// Prefix for everything, derived from the input file name
    dataset_name: String,
    /// Learner width parameter, part of every folder name
    k: usize
}

impl WorkLayout {
    pub fn new(work_folder: PathBuf, dataset_name: String, k: usize) -> Self {
        Self { work_folder, dataset_name, k }
    }

    pub fn work_folder(&self) -> &Path {
        &self.work_folder
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Folder holding the learner input and output for one variant
    pub fn variant_dir(&self, variant: VariantId, family: VariantFamily) -> PathBuf {
        self.work_folder.join(variant.dir_name(&self.dataset_name, self.k, family))
    }

    pub fn result_path(&self, variant: VariantId, family: VariantFamily) -> PathBuf {
        self.variant_dir(variant, family).join(RESULT_FILENAME)
    }

    pub fn log_path(&self, variant: VariantId, family: VariantFamily) -> PathBuf {
        self.variant_dir(variant, family).join(LOG_FILENAME)
    }

    /// The run script rendered with this `k`
    pub fn run_script_path(&self) -> PathBuf {
        self.work_folder.join(format!("{}_run-{}.sh", self.dataset_name, self.k))
    }
}

/// Derives the dataset name from an input path, i.e. the file name up to its first `.`
pub fn dataset_name_from_path(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy())
        .and_then(|f| f.split('.').next().map(|s| s.to_string()))
        .unwrap_or_default()
}
