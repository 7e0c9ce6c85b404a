//! Classifier rules deciding which add-ons appear in which report
//!
//! Every report is backed by one [`Rule`]. Rules are pure functions of a
//! catalog entry and the read-only [`ClassifierContext`]; composed rules hold
//! their dependencies as [`SharedRule`] handles, so a rule can only ever call
//! rules that were constructed before it.

pub mod annotations;
pub mod compatible;
pub mod general;
pub mod lost;
pub mod permissions;
pub mod source_scan;
pub mod version_window;

pub use annotations::{Annotation, StatusChain};
pub use compatible::CompatibleRule;
pub use general::{
    AnyReleaseRule, FreshnessBasis, FreshnessRule, LatestCurrentMismatchRule, ParsingErrorRule,
    PurgeCandidateRule, WrongOrderRule,
};
pub use lost::LostRule;
pub use permissions::RequestedPermissionsRule;
pub use source_scan::MissingPermissionRule;
pub use version_window::{
    LostPureWithUpperLimitRule, ManuallyLoweredRule, PureWithUpperLimitRule,
    UnboundedExperimentRule, VersionWindowRule, WindowMismatch,
};

use crate::models::{AlternativeData, CatalogEntry, CuratedLists, RowData, SUPPORTED_ESR};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Classification of one catalog entry for one report.
pub trait Rule: Send + Sync {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData;
}

pub type SharedRule = Arc<dyn Rule>;

/// Read-only inputs shared by all rules during a run.
#[derive(Debug, Clone)]
pub struct ClassifierContext {
    pub lists: CuratedLists,
    pub alternatives: AlternativeData,
    /// Supported ESR majors, ascending.
    pub releases: Vec<u32>,
    /// Reference time for freshness windows and report dates.
    pub now: DateTime<Utc>,
    /// Base directory for relative `localExtensionDir` paths.
    pub source_root: Option<PathBuf>,
}

impl ClassifierContext {
    pub fn new(lists: CuratedLists, alternatives: AlternativeData, now: DateTime<Utc>) -> Self {
        Self {
            lists,
            alternatives,
            releases: SUPPORTED_ESR.to_vec(),
            now,
            source_root: None,
        }
    }

    pub fn with_releases(mut self, releases: &[u32]) -> Self {
        let mut releases = releases.to_vec();
        releases.sort_unstable();
        releases.dedup();
        self.releases = releases;
        self
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    pub fn oldest_release(&self) -> Option<u32> {
        self.releases.first().copied()
    }

    /// Resolve an artifact directory recorded by the download pipeline.
    pub fn source_dir(&self, dir: &Path) -> PathBuf {
        match &self.source_root {
            Some(root) if dir.is_relative() => root.join(dir),
            _ => dir.to_path_buf(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixture builders shared by the rule tests.

    use super::*;
    use crate::models::{AppVersionRange, AtnCompatibility, AtnFile, AtnVersion, CompatibilityIndex, ParsedArtifact};
    use chrono::TimeZone;

    pub fn context() -> ClassifierContext {
        ClassifierContext::new(
            CuratedLists::default(),
            AlternativeData::default(),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
        )
    }

    pub fn pure_artifact() -> ParsedArtifact {
        ParsedArtifact {
            mext: true,
            ..Default::default()
        }
    }

    pub fn with_atn(mut data: ParsedArtifact, min: &str, max: &str, created: &str) -> ParsedArtifact {
        data.atn = Some(AtnVersion {
            compatibility: Some(AtnCompatibility {
                thunderbird: Some(AppVersionRange {
                    min: Some(min.to_string()),
                    max: Some(max.to_string()),
                }),
            }),
            files: vec![AtnFile {
                created: Some(created.to_string()),
                url: None,
            }],
            ..Default::default()
        });
        data
    }

    pub fn with_strict_max(mut data: ParsedArtifact, strict_max: &str) -> ParsedArtifact {
        let manifest: crate::models::ArtifactManifest = serde_json::from_value(serde_json::json!({
            "browser_specific_settings": { "gecko": { "strict_max_version": strict_max } }
        }))
        .unwrap();
        data.manifest = Some(manifest);
        data
    }

    /// Entry whose releases each map to their own version/artifact pair.
    pub fn entry(id: u64, releases: &[(&str, &str, ParsedArtifact)]) -> CatalogEntry {
        let mut index = CompatibilityIndex::default();
        for (label, version, data) in releases {
            index.cmp_data.insert(label.to_string(), version.to_string());
            index.ext_data.insert(version.to_string(), data.clone());
        }
        CatalogEntry {
            id,
            guid: format!("addon-{}@example.org", id),
            slug: format!("addon-{}", id),
            name: [("en-US".to_string(), Some(format!("Add-on {}", id)))]
                .into_iter()
                .collect(),
            default_locale: None,
            url: format!("https://addons.thunderbird.net/addon/addon-{}/", id),
            created: None,
            average_daily_users: 0,
            xpilib: Some(index),
            extra: Default::default(),
        }
    }
}
