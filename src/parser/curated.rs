//! Curated exception list loading

use crate::models::CuratedLists;
use anyhow::{Context, Result};
use std::path::Path;

const DEFAULT_LISTS: &str = include_str!("../../data/curated_lists.json5");

/// Parse curated lists from JSON5 text (comments and trailing commas allowed)
pub fn parse_curated_lists(content: &str) -> Result<CuratedLists> {
    json5::from_str(content).context("Failed to parse curated lists")
}

/// Lists shipped with the crate
pub fn default_curated_lists() -> Result<CuratedLists> {
    parse_curated_lists(DEFAULT_LISTS)
}

/// Load curated lists from a file
pub fn load_curated_lists(path: &Path) -> Result<CuratedLists> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read curated lists {}", path.display()))?;
    parse_curated_lists(&content)
        .with_context(|| format!("Invalid curated lists {}", path.display()))
}
