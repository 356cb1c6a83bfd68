
use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::generate::GenerateSettings;
use crate::cli::run::RunSettings;
use crate::cli::score::ScoreSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2023-{}
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
research use only.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// SMILE, in-silico knock-outs scored against a learned gene network.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Full pipeline: generate knock-out inputs, run the learner on each, and score them
    Run(Box<RunSettings>),
    /// Only generate the knock-out input folders and the rendered run script
    Generate(Box<GenerateSettings>),
    /// Only score existing learner outputs in a work folder
    Score(Box<ScoreSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise return an error
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "smile", "run",
            "-i", "expr.csv", "-w", "work", "-o", "out",
            "-s", "run.sh", "--banlist", "ban.txt", "--whitelist", "white.txt",
            "-k", "30", "--threads", "4", "--timeout", "60", "-vv"
        ]).unwrap();
        match cli.command {
            Commands::Run(settings) => {
                assert_eq!(settings.dataset.k, 30);
                assert_eq!(settings.threads, 4);
                assert_eq!(settings.timeout_secs, 60);
                assert_eq!(settings.verbosity, 2);
                assert_eq!(settings.shell, "sh");
                assert_eq!(settings.learner_inputs.banlist, Path::new("ban.txt"));
            },
            _ => panic!("expected the run subcommand")
        }
    }

    #[test]
    fn test_parse_score_default_k() {
        let cli = Cli::try_parse_from(["smile", "score", "-i", "expr.csv", "-w", "work", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Score(settings) => assert_eq!(settings.dataset.k, 20),
            _ => panic!("expected the score subcommand")
        }
    }
}
