
use anyhow::bail;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::check_required_filename;

/// Arguments that identify a dataset and its work folder
#[derive(Args, Clone, Default, Serialize)]
pub struct DatasetArgs {
    /// Time-course table: names row, levels row, then one row per stage
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "CSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_fn: PathBuf,

    /// Folder holding one sub-folder per variant and the rendered run script
    #[clap(required = true)]
    #[clap(short = 'w')]
    #[clap(long = "work-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub work_folder: PathBuf,

    /// Learner width parameter, passed through to the run script
    #[clap(short = 'k')]
    #[clap(long = "k")]
    #[clap(value_name = "INT")]
    #[clap(help_heading = Some("Learner parameters"))]
    #[clap(default_value = "20")]
    pub k: usize,
}

/// Files copied into or used to drive every variant folder
#[derive(Args, Clone, Default, Serialize)]
pub struct LearnerInputArgs {
    /// Learner run script template; any "k=<integer>" line is replaced with the chosen k
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "run-script")]
    #[clap(value_name = "SH")]
    #[clap(help_heading = Some("Learner inputs"))]
    pub run_script: PathBuf,

    /// Banned edge list, copied verbatim into each variant folder
    #[clap(required = true)]
    #[clap(long = "banlist")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Learner inputs"))]
    pub banlist: PathBuf,

    /// Required edge list, copied verbatim into each variant folder
    #[clap(required = true)]
    #[clap(long = "whitelist")]
    #[clap(value_name = "TXT")]
    #[clap(help_heading = Some("Learner inputs"))]
    pub whitelist: PathBuf,
}

pub fn check_dataset_args(dataset: &DatasetArgs) -> anyhow::Result<()> {
    check_required_filename(&dataset.input_fn, "Input table")?;
    info!("Inputs:");
    info!("\tInput table: {:?}", &dataset.input_fn);
    info!("\tWork folder: {:?}", &dataset.work_folder);

    if dataset.k == 0 {
        bail!("--k must be >0");
    }
    info!("Learner parameters:");
    info!("\tk: {}", dataset.k);
    Ok(())
}

pub fn check_learner_input_args(learner_inputs: &LearnerInputArgs) -> anyhow::Result<()> {
    check_required_filename(&learner_inputs.run_script, "Run script")?;
    check_required_filename(&learner_inputs.banlist, "Banlist")?;
    check_required_filename(&learner_inputs.whitelist, "Whitelist")?;
    info!("Learner inputs:");
    info!("\tRun script: {:?}", &learner_inputs.run_script);
    info!("\tBanlist: {:?}", &learner_inputs.banlist);
    info!("\tWhitelist: {:?}", &learner_inputs.whitelist);
    Ok(())
}
