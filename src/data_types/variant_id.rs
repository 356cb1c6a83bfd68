
use serde::Serialize;
use std::fmt;

/// The two input layouts every variant is materialized in
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::Display, strum_macros::EnumIter)]
pub enum VariantFamily {
    /// Stage/index columns plus the gene expression columns
    #[strum(serialize = "full")]
    Full,
    /// Only the gene expression columns
    #[strum(serialize = "genes-only")]
    GenesOnly,
}

impl VariantFamily {
    /// Suffix appended to directory and output file names for this family
    pub fn suffix(&self) -> &'static str {
        match self {
            VariantFamily::Full => "",
            VariantFamily::GenesOnly => "-GeneOnly"
        }
    }
}

/// Identifies one variant of the observation matrix.
/// Gene and stage are 1-based for knock-outs; `(0, 0)` is the unmodified baseline.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct VariantId {
    /// 1-based gene index, 0 for the baseline
    gene: usize,
    /// 1-based first knocked-out stage, 0 for the baseline
    stage: usize
}

impl VariantId {
    /// The unmodified wild-type variant
    pub fn baseline() -> Self {
        Self::default()
    }

    /// A knock-out of `gene` starting at `stage`, both 1-based
    pub fn knockout(gene: usize, stage: usize) -> Self {
        Self { gene, stage }
    }

    pub fn gene(&self) -> usize {
        self.gene
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn is_baseline(&self) -> bool {
        self.gene == 0 && self.stage == 0
    }

    /// Name of the working directory for this variant, e.g. `expr_N2-3-20-GeneOnly`.
    /// # Arguments
    /// * `dataset_name` - prefix shared by all variants of a dataset
    /// * `k` - learner width parameter, only used for naming here
    /// * `family` - the input layout of the variant
    pub fn dir_name(&self, dataset_name: &str, k: usize, family: VariantFamily) -> String {
        format!("{dataset_name}_N{}-{}-{k}{}", self.gene, self.stage, family.suffix())
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(gene={}, stage={})", self.gene, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_name() {
        assert_eq!(VariantId::baseline().dir_name("expr", 20, VariantFamily::Full), "expr_N0-0-20");
        assert_eq!(VariantId::knockout(2, 3).dir_name("expr", 20, VariantFamily::GenesOnly), "expr_N2-3-20-GeneOnly");
    }

    #[test]
    fn test_baseline() {
        assert!(VariantId::baseline().is_baseline());
        assert!(!VariantId::knockout(1, 1).is_baseline());
        assert_eq!(format!("{}", VariantId::knockout(1, 2)), "(gene=1, stage=2)");
    }
}
