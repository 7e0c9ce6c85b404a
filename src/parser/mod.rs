//! Loading of the run inputs: catalog, curated lists, alternatives

pub mod alternatives;
pub mod catalog;
pub mod curated;

pub use alternatives::{load_alternatives, parse_alternatives};
pub use catalog::{load_catalog, parse_catalog};
pub use curated::{default_curated_lists, load_curated_lists, parse_curated_lists};
