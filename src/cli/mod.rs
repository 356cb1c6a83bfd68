/*!
# CLI module
Command line interface functionality that is specific to SMILE.
*/

/// Argument groups shared by several subcommands
pub mod common;
/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The generate CLI subcommand
pub mod generate;
/// The run CLI subcommand
pub mod run;
/// The score CLI subcommand
pub mod score;
