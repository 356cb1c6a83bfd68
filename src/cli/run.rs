
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::common::{check_dataset_args, check_learner_input_args, DatasetArgs, LearnerInputArgs};
use crate::cli::core::{AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct RunSettings {
    #[clap(skip)]
    smile_version: String,

    #[clap(flatten)]
    pub dataset: DatasetArgs,

    #[clap(flatten)]
    pub learner_inputs: LearnerInputArgs,

    /// Output directory for the divergence tables
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Interpreter used to run the learner script
    #[clap(long = "shell")]
    #[clap(value_name = "PROGRAM")]
    #[clap(help_heading = Some("Learner parameters"))]
    #[clap(default_value = "sh")]
    pub shell: String,

    /// Kill a learner run after this many seconds (0 = no limit)
    #[clap(long = "timeout")]
    #[clap(value_name = "SECONDS")]
    #[clap(help_heading = Some("Learner parameters"))]
    #[clap(default_value = "0")]
    pub timeout_secs: u64,

    /// Number of learner runs to execute in parallel
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl RunSettings {
    /// The learner timeout, `None` when unlimited
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

pub fn check_run_settings(mut settings: RunSettings) -> anyhow::Result<RunSettings> {
    // hard code the version in
    settings.smile_version = FULL_VERSION.clone();
    info!("SMILE version: {:?}", &settings.smile_version);
    info!("Sub-command: run");

    check_dataset_args(&settings.dataset)?;
    info!("\tShell: {:?}", &settings.shell);
    match settings.timeout() {
        Some(timeout) => info!("\tTimeout: {timeout:?}"),
        None => info!("\tTimeout: None")
    };
    check_learner_input_args(&settings.learner_inputs)?;

    info!("Outputs:");
    info!("\tOutput folder: {:?}", &settings.output_folder);

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
