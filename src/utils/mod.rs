//! Shared utilities

pub mod helpers;
pub mod version;

pub use version::{compare, compare_versions};
