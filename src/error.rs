//! Typed failures raised while registering and rendering reports

use crate::models::BadgeKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A rule emitted a badge the registry has no descriptor for.
    #[error("unknown badge kind '{0}'")]
    UnknownBadge(BadgeKind),

    #[error("report '{0}' is already registered")]
    DuplicateReport(String),

    #[error("report '{report}' refers to undeclared group '{group}'")]
    UnknownGroup { report: String, group: String },

    #[error("group '{0}' is already declared")]
    DuplicateGroup(String),

    #[error("failed to read template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
