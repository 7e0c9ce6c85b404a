//! Alternative add-on dataset parsing
//!
//! The community list is YAML-like but not valid YAML (guids such as
//! `{e2fda1a4-...}` are unquoted), so it is read block by block: blocks are
//! separated by `---`, each line is `key: value`, `#` starts a comment.

use crate::models::{Alternative, AlternativeData};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Parse the alternatives list into a guid lookup table
pub fn parse_alternatives(content: &str) -> AlternativeData {
    let mut data = AlternativeData::new();

    for (index, block) in split_blocks(content).iter().enumerate() {
        let fields = parse_block(block);
        if fields.is_empty() {
            continue;
        }
        let (Some(guid), Some(name)) = (fields.get("u_id"), fields.get("r_name")) else {
            warn!(block = index, "alternative entry without u_id or r_name");
            continue;
        };
        data.insert(
            guid.clone(),
            Alternative {
                name: name.clone(),
                link: fields.get("r_link").filter(|l| !l.is_empty()).cloned(),
            },
        );
    }

    data
}

/// Load the alternatives list from a file
pub fn load_alternatives(path: &Path) -> Result<AlternativeData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read alternatives {}", path.display()))?;
    let data = parse_alternatives(&content);
    info!(addons = data.len(), "loaded alternative add-on data");
    Ok(data)
}

fn parse_block(lines: &[&str]) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in lines {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if !key.is_empty() {
            fields.insert(key.to_string(), value.trim().to_string());
        }
    }
    fields
}

/// Group lines into blocks ended by a `---` line.
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = vec![Vec::new()];
    for line in content.lines() {
        if line.trim().starts_with("---") {
            blocks.push(Vec::new());
        } else if let Some(current) = blocks.last_mut() {
            current.push(line);
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
---
# Lightning is part of Thunderbird
u_name: Old Calendar
u_id: {e2fda1a4-762b-4020-b5ad-a41df1933103}
r_name: Built-in calendar
---
u_name: Old Tool
u_id: old-tool@example.org
r_name: New Tool
r_link: https://addons.thunderbird.net/addon/new-tool/
---
u_id: old-tool@example.org
r_name: Other Tool
---
u_name: missing fields
";

    #[test]
    fn test_parse_alternatives() {
        let data = parse_alternatives(SAMPLE);
        assert_eq!(data.len(), 2);

        let calendar = data.get("{e2fda1a4-762b-4020-b5ad-a41df1933103}").unwrap();
        assert_eq!(calendar[0].name, "Built-in calendar");
        assert_eq!(calendar[0].link, None);

        let tool = data.get("old-tool@example.org").unwrap();
        assert_eq!(tool.len(), 2);
        assert_eq!(
            tool[0].link.as_deref(),
            Some("https://addons.thunderbird.net/addon/new-tool/")
        );
        assert_eq!(tool[1].name, "Other Tool");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_alternatives("").is_empty());
    }
}
