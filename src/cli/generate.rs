
use clap::Args;
use log::info;
use serde::Serialize;

use crate::cli::common::{check_dataset_args, check_learner_input_args, DatasetArgs, LearnerInputArgs};
use crate::cli::core::{AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct GenerateSettings {
    #[clap(skip)]
    smile_version: String,

    #[clap(flatten)]
    pub dataset: DatasetArgs,

    #[clap(flatten)]
    pub learner_inputs: LearnerInputArgs,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_generate_settings(mut settings: GenerateSettings) -> anyhow::Result<GenerateSettings> {
    settings.smile_version = FULL_VERSION.clone();
    info!("SMILE version: {:?}", &settings.smile_version);
    info!("Sub-command: generate");

    check_dataset_args(&settings.dataset)?;
    check_learner_input_args(&settings.learner_inputs)?;
    Ok(settings)
}
