/*!
# Writers module
Contains the logic for writing the learner inputs and the divergence outputs.
*/
/// Writes the grid and flattened divergence tables
pub mod divergence_csv;
/// Prepares the per-variant learner input folders
pub mod variant_input;
