//! Core data models for catalog classification

pub mod alternative;
pub mod badge;
pub mod catalog;
pub mod curated;
pub mod manifest;
pub mod release;

pub use alternative::*;
pub use badge::*;
pub use catalog::*;
pub use curated::*;
pub use manifest::*;
pub use release::*;
