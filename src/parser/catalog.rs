//! Catalog loading

use crate::models::CatalogEntry;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Parse a catalog from a JSON array. `null` slots and entries that do not
/// match the catalog schema are dropped with a warning; the rest survive.
pub fn parse_catalog(content: &str) -> Result<Vec<CatalogEntry>> {
    let raw: Vec<Value> = serde_json::from_str(content).context("Failed to parse catalog")?;
    let total = raw.len();
    let mut entries = Vec::with_capacity(total);
    for (index, value) in raw.into_iter().enumerate() {
        if value.is_null() {
            continue;
        }
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<CatalogEntry>(value) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(index, id = %id, "skipping malformed catalog entry: {}", err),
        }
    }
    if entries.len() != total {
        warn!(skipped = total - entries.len(), "catalog contains null or malformed entries");
    }
    Ok(entries)
}

/// Load the catalog produced by the download pipeline
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let entries = parse_catalog(&content)?;
    info!(entries = entries.len(), path = %path.display(), "loaded catalog");
    Ok(entries)
}
