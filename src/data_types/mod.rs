/// Divergence results in grid and flattened layouts
pub mod divergence_table;
/// The parsed time-course table and its stage/gene dimensions
pub mod observation;
/// Learner output matrices with missing-value tracking
pub mod probability_matrix;
/// Rectangular text grids that round-trip cells verbatim
pub mod text_matrix;
/// Variant identities and families
pub mod variant_id;
/// File and folder naming for the per-variant work folders
pub mod work_layout;
