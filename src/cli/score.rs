
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{check_dataset_args, DatasetArgs};
use crate::cli::core::{AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ScoreSettings {
    #[clap(skip)]
    smile_version: String,

    #[clap(flatten)]
    pub dataset: DatasetArgs,

    /// Output directory for the divergence tables
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_score_settings(mut settings: ScoreSettings) -> anyhow::Result<ScoreSettings> {
    settings.smile_version = FULL_VERSION.clone();
    info!("SMILE version: {:?}", &settings.smile_version);
    info!("Sub-command: score");

    check_dataset_args(&settings.dataset)?;
    if !settings.dataset.work_folder.is_dir() {
        anyhow::bail!("Work folder does not exist: \"{}\"", settings.dataset.work_folder.display());
    }

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);
    Ok(settings)
}
