//! Manifest fields extracted from an unpacked add-on
//!
//! Manifests found in the wild are frequently malformed, so every field is
//! optional and unknown keys are kept verbatim.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Manifest keys which grant UI or integration surfaces without being listed
/// in `permissions`.
pub const CAPABILITY_KEYS: &[&str] = &[
    "compose_action",
    "browser_action",
    "message_display_action",
    "cloud_file",
    "commands",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactManifest {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_experiment: Option<Value>,

    /// Pre-Thunderbird-91 location of the gecko settings.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub applications: Option<BrowserSpecificSettings>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub browser_specific_settings: Option<BrowserSpecificSettings>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub experiment_apis: Option<BTreeMap<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserSpecificSettings {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub gecko: Option<GeckoSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeckoSettings {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub strict_min_version: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub strict_max_version: Option<String>,
}

/// A value of the wrong shape reads as absent instead of failing the
/// whole catalog entry.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).ok())
}

impl ArtifactManifest {
    /// String permissions, in declaration order. `None` when the manifest has
    /// no `permissions` array at all.
    pub fn permission_names(&self) -> Option<Vec<&str>> {
        self.permissions
            .as_ref()
            .map(|perms| perms.iter().filter_map(Value::as_str).collect())
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permission_names()
            .map(|names| names.contains(&name))
            .unwrap_or(false)
    }

    pub fn has_theme_experiment(&self) -> bool {
        self.theme_experiment
            .as_ref()
            .map(crate::utils::helpers::is_truthy)
            .unwrap_or(false)
    }

    /// Declared `strict_max_version`, looking at `applications` before
    /// `browser_specific_settings`. Empty strings count as absent.
    pub fn strict_max_version(&self) -> Option<&str> {
        [&self.applications, &self.browser_specific_settings]
            .into_iter()
            .filter_map(|settings| settings.as_ref())
            .filter_map(|settings| settings.gecko.as_ref())
            .filter_map(|gecko| gecko.strict_max_version.as_deref())
            .find(|v| !v.is_empty())
    }

    /// Whether a top-level key such as `compose_action` is present and truthy.
    pub fn has_key(&self, key: &str) -> bool {
        let value = match key {
            "theme_experiment" => self.theme_experiment.as_ref(),
            "legacy" => self.legacy.as_ref(),
            _ => self.extra.get(key),
        };
        value.map(crate::utils::helpers::is_truthy).unwrap_or(false)
    }
}
