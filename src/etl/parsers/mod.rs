/// Parsers Module
///
/// Contains tag parsers for OpenStreetMap nodes.
/// Each parser resolves one normalized field from a node's raw tags.
pub mod address;
pub mod tags;

// Re-export commonly used parsers
pub use address::parse_address;
pub use tags::{first_non_empty, non_empty};
