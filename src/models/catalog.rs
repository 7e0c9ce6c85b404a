//! Catalog entries and their per-release compatibility index

use super::manifest::ArtifactManifest;
use super::release::ReleaseLabel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One add-on as published on ATN, plus the compatibility index attached by
/// the download pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,

    #[serde(default)]
    pub guid: String,

    #[serde(default)]
    pub slug: String,

    /// Localized names, keyed by locale.
    #[serde(default)]
    pub name: BTreeMap<String, Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default)]
    pub average_daily_users: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpilib: Option<CompatibilityIndex>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The `xpilib` record: which version serves each release and what was
/// found inside each of those versions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompatibilityIndex {
    /// Release key (`"60"`, ..., `"current"`) to version string.
    #[serde(default)]
    pub cmp_data: BTreeMap<String, String>,

    /// Version string to parsed artifact.
    #[serde(default)]
    pub ext_data: BTreeMap<String, ParsedArtifact>,

    /// 1-based popularity rank, assigned by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

/// Packaging facts decoded from one downloaded version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedArtifact {
    /// Packaged with a `manifest.json`.
    #[serde(default)]
    pub mext: bool,

    #[serde(default)]
    pub legacy: bool,

    /// `xul` or `bootstrap` for legacy packages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<String>,

    #[serde(default)]
    pub experiment: bool,

    #[serde(default, rename = "experimentSchemaNames")]
    pub experiment_schema_names: Vec<String>,

    #[serde(
        default,
        deserialize_with = "super::manifest::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub manifest: Option<ArtifactManifest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atn: Option<AtnVersion>,

    #[serde(
        default,
        rename = "localExtensionDir",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_extension_dir: Option<PathBuf>,
}

/// Raw version record from the ATN API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtnVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<AtnCompatibility>,

    #[serde(default)]
    pub files: Vec<AtnFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtnCompatibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thunderbird: Option<AppVersionRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppVersionRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtnFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A release label that resolved to both a version and its artifact data.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRelease<'a> {
    pub version: &'a str,
    pub data: &'a ParsedArtifact,
}

impl CatalogEntry {
    /// Version and artifact serving `label`. A version without artifact data
    /// resolves to `None`, same as a missing version.
    pub fn resolve(&self, label: ReleaseLabel) -> Option<ResolvedRelease<'_>> {
        let index = self.xpilib.as_ref()?;
        let version = index.cmp_data.get(&label.key())?;
        let data = index.ext_data.get(version)?;
        Some(ResolvedRelease { version, data })
    }

    /// Artifact data serving `label`.
    pub fn data(&self, label: ReleaseLabel) -> Option<&ParsedArtifact> {
        self.resolve(label).map(|r| r.data)
    }

    /// Resolve every ESR in `releases`, preserving their order.
    pub fn resolve_all(&self, releases: &[u32]) -> Vec<(u32, Option<ResolvedRelease<'_>>)> {
        releases
            .iter()
            .map(|&major| (major, self.resolve(ReleaseLabel::Esr(major))))
            .collect()
    }

    pub fn rank(&self) -> Option<usize> {
        self.xpilib.as_ref().and_then(|index| index.rank)
    }

    fn localized_name(&self, locale: &str) -> Option<&str> {
        self.name.get(locale).and_then(|n| n.as_deref())
    }

    /// Name in `en-US`, else the declared default locale, else any locale.
    pub fn display_name(&self) -> &str {
        self.localized_name("en-US")
            .or_else(|| {
                self.default_locale
                    .as_deref()
                    .and_then(|locale| self.localized_name(locale))
            })
            .or_else(|| self.name.values().flatten().map(String::as_str).next())
            .unwrap_or(self.slug.as_str())
    }
}

impl ParsedArtifact {
    /// Uses only the stable WebExtension surface: manifest packaging, not
    /// legacy, no experiment APIs, no theme experiment.
    pub fn is_pure(&self) -> bool {
        self.mext && !self.legacy && !self.experiment && !self.has_theme_experiment()
    }

    pub fn is_xul_legacy(&self) -> bool {
        self.legacy_type.as_deref() == Some("xul")
    }

    pub fn has_theme_experiment(&self) -> bool {
        self.manifest
            .as_ref()
            .map(ArtifactManifest::has_theme_experiment)
            .unwrap_or(false)
    }

    fn app_range(&self) -> Option<&AppVersionRange> {
        self.atn
            .as_ref()?
            .compatibility
            .as_ref()?
            .thunderbird
            .as_ref()
    }

    /// Minimum application version advertised by ATN, `*` if unset.
    pub fn atn_min(&self) -> &str {
        self.app_range()
            .and_then(|r| r.min.as_deref())
            .filter(|v| !v.is_empty())
            .unwrap_or("*")
    }

    /// Maximum application version advertised by ATN, `*` if unset.
    pub fn atn_max(&self) -> &str {
        self.app_range()
            .and_then(|r| r.max.as_deref())
            .filter(|v| !v.is_empty())
            .unwrap_or("*")
    }

    /// `strict_max_version` declared in the packaged manifest, `*` if unset.
    pub fn strict_max(&self) -> &str {
        self.manifest
            .as_ref()
            .and_then(ArtifactManifest::strict_max_version)
            .unwrap_or("*")
    }

    /// Upload timestamp of the first file of this version.
    pub fn uploaded(&self) -> Option<&str> {
        self.atn
            .as_ref()?
            .files
            .first()?
            .created
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> CatalogEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolve_requires_version_and_data() {
        let e = entry(
            r#"{
                "id": 1,
                "xpilib": {
                    "cmp_data": { "60": "1.0", "68": "2.0" },
                    "ext_data": { "1.0": { "mext": true } }
                }
            }"#,
        );
        let r60 = e.resolve(ReleaseLabel::Esr(60)).unwrap();
        assert_eq!(r60.version, "1.0");
        assert!(r60.data.mext);
        // Version without data resolves like a missing version.
        assert!(e.resolve(ReleaseLabel::Esr(68)).is_none());
        assert!(e.resolve(ReleaseLabel::Esr(78)).is_none());
        assert!(e.resolve(ReleaseLabel::Current).is_none());
    }

    #[test]
    fn test_resolve_without_index() {
        let e = entry(r#"{ "id": 2 }"#);
        assert!(e.resolve(ReleaseLabel::Current).is_none());
        assert!(e.resolve_all(&[60, 68]).iter().all(|(_, r)| r.is_none()));
    }

    #[test]
    fn test_purity_flips() {
        let pure = ParsedArtifact {
            mext: true,
            ..Default::default()
        };
        assert!(pure.is_pure());

        let mut p = pure.clone();
        p.mext = false;
        assert!(!p.is_pure());

        let mut p = pure.clone();
        p.legacy = true;
        assert!(!p.is_pure());

        let mut p = pure.clone();
        p.experiment = true;
        assert!(!p.is_pure());

        let mut p = pure.clone();
        p.manifest = Some(ArtifactManifest {
            theme_experiment: Some(serde_json::json!({ "stylesheet": "a.css" })),
            ..Default::default()
        });
        assert!(!p.is_pure());
    }

    #[test]
    fn test_atn_window_defaults() {
        let data = ParsedArtifact::default();
        assert_eq!(data.atn_min(), "*");
        assert_eq!(data.atn_max(), "*");
        assert_eq!(data.strict_max(), "*");
        assert_eq!(data.uploaded(), None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let e = entry(r#"{ "id": 3, "slug": "s", "name": { "de": "Hallo", "fr": "Salut" }, "default_locale": "fr" }"#);
        assert_eq!(e.display_name(), "Salut");
        let e = entry(r#"{ "id": 3, "slug": "s", "name": { "de": "Hallo", "en-US": "Hello" } }"#);
        assert_eq!(e.display_name(), "Hello");
        let e = entry(r#"{ "id": 3, "slug": "s" }"#);
        assert_eq!(e.display_name(), "s");
    }
}
