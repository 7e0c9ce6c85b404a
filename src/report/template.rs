//! HTML templates with `__placeholder__` substitution

use crate::error::ReportError;
use std::fs;
use std::path::Path;

pub const DEFAULT_REPORT_TEMPLATE: &str = include_str!("../../templates/report-template.html");
pub const DEFAULT_INDEX_TEMPLATE: &str = include_str!("../../templates/index-template.html");

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ReportError> {
        fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| ReportError::Template {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Template at `path`, or `fallback` when no path is configured.
    pub fn load_or(path: Option<&Path>, fallback: &str) -> Result<Self, ReportError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::new(fallback)),
        }
    }

    /// Replace the first occurrence of each `(placeholder, value)` pair, in
    /// order. Later placeholders are looked up in the already substituted
    /// text.
    pub fn fill(&self, values: &[(&str, &str)]) -> String {
        values
            .iter()
            .fold(self.source.clone(), |text, (placeholder, value)| {
                text.replacen(placeholder, value, 1)
            })
    }
}
