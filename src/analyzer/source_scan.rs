//! Scanning unpacked add-on sources for API calls that need a permission

use super::{ClassifierContext, Rule};
use crate::models::{Badge, BadgeBase, CatalogEntry, ReleaseLabel, RowData};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

lazy_static! {
    static ref MESSAGES_UPDATE_CALL: Regex = Regex::new(r"\.messages\.update").unwrap();
}

/// Directory below `localExtensionDir` holding the unpacked package.
const SOURCE_SUBDIR: &str = "src";

/// Every `path:line` below `dir` matching `pattern`, in file-name order.
/// Unreadable files are skipped.
pub fn find_in_sources(dir: &Path, pattern: &Regex) -> Vec<String> {
    let mut hits = Vec::new();
    let walker = WalkDir::new(dir).sort_by_file_name();
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let content = match fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                debug!("Skipping unreadable {}: {}", path.display(), err);
                continue;
            }
        };
        let relative = path.strip_prefix(dir).unwrap_or(path);
        hits.extend(
            content
                .lines()
                .enumerate()
                .filter(|(_, line)| pattern.is_match(line))
                .map(|(n, _)| format!("{}:{}", relative.display(), n + 1)),
        );
    }
    hits
}

/// Artifacts for `release` that call an API without requesting the
/// permission it requires. Badge tooltips list the offending lines.
pub struct MissingPermissionRule {
    release: u32,
    permission: &'static str,
    pattern: &'static Regex,
}

impl MissingPermissionRule {
    /// `missing-messagesUpdate-permission`
    pub fn messages_update(release: u32) -> Self {
        Self {
            release,
            permission: "messagesUpdate",
            pattern: &*MESSAGES_UPDATE_CALL,
        }
    }
}

impl Rule for MissingPermissionRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(data) = entry.data(ReleaseLabel::Esr(self.release)) else {
            return RowData::excluded();
        };
        let granted = data
            .manifest
            .as_ref()
            .map(|m| m.has_permission(self.permission))
            .unwrap_or(false);
        if granted {
            return RowData::excluded();
        }
        let Some(dir) = data.local_extension_dir.as_deref() else {
            return RowData::excluded();
        };

        let sources = ctx.source_dir(dir).join(SOURCE_SUBDIR);
        let hits = find_in_sources(&sources, self.pattern);
        if hits.is_empty() {
            return RowData::excluded();
        }
        RowData::included(vec![
            Badge::new(BadgeBase::BreakingApiChange).with_tooltip(hits.join("\n"))
        ])
    }
}
