/// Loads learner outputs for a variant family and scores each knock-out against the baseline
pub mod aggregator;
/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Jensen-Shannon and Kullback-Leibler divergence
pub mod divergence;
/// Launches the external network learner on prepared variant folders
pub mod learner;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Various utility functions that tend to be very generic
pub mod util;
/// Derives the baseline and knock-out inputs from an observation matrix
pub mod variant_generator;
/// All output writers
pub mod writers;
