//! Manually maintained knowledge about individual add-ons
//!
//! These lists capture what cannot be derived from ATN data: add-ons that
//! are known to be discontinued, pending pull requests, maintainer contacts
//! and so on. They are loaded once and only ever read.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Add-on id as assigned by ATN.
pub type AddonId = u64;

/// WebExtension API capabilities an add-on is known to be waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Column,
    Filter,
    RecentFolders,
    Attachment,
    RecipientChanged,
    StatusBar,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratedLists {
    /// Excluded from the lost reports entirely.
    pub ignored: BTreeSet<AddonId>,
    pub discontinued: BTreeSet<AddonId>,
    pub wip: BTreeSet<AddonId>,

    /// Add-on id to pull request (or patched build) URL.
    #[serde(deserialize_with = "keyed_by_number")]
    pub pending_pr: BTreeMap<AddonId, String>,

    /// Add-on id to a note or URL describing the maintainer contact.
    #[serde(deserialize_with = "keyed_by_number")]
    pub contacted: BTreeMap<AddonId, String>,

    /// Add-on id to an analysis note or URL (may be empty).
    #[serde(deserialize_with = "keyed_by_number")]
    pub investigated: BTreeMap<AddonId, String>,

    /// Add-ons broken by the `messagesUpdate` permission split.
    pub messages_update: BTreeSet<AddonId>,

    pub column_api: BTreeSet<AddonId>,
    pub filter_api: BTreeSet<AddonId>,
    pub recent_folders_api: BTreeSet<AddonId>,
    pub attachment_api: BTreeSet<AddonId>,
    pub recipient_changed_api: BTreeSet<AddonId>,
    pub status_bar_api: BTreeSet<AddonId>,

    /// ESR major version to add-ons manually verified to work there.
    #[serde(deserialize_with = "keyed_by_number")]
    pub known_compatible: BTreeMap<u32, BTreeSet<AddonId>>,

    /// ESR major version to add-ons manually verified to be broken there.
    #[serde(deserialize_with = "keyed_by_number")]
    pub known_broken: BTreeMap<u32, BTreeSet<AddonId>>,
}

impl CuratedLists {
    pub fn is_ignored(&self, id: AddonId) -> bool {
        self.ignored.contains(&id)
    }

    pub fn is_discontinued(&self, id: AddonId) -> bool {
        self.discontinued.contains(&id)
    }

    pub fn is_wip(&self, id: AddonId) -> bool {
        self.wip.contains(&id)
    }

    pub fn pending_pr(&self, id: AddonId) -> Option<&str> {
        self.pending_pr.get(&id).map(String::as_str)
    }

    pub fn contacted(&self, id: AddonId) -> Option<&str> {
        self.contacted.get(&id).map(String::as_str)
    }

    pub fn investigated(&self, id: AddonId) -> Option<&str> {
        self.investigated.get(&id).map(String::as_str)
    }

    pub fn needs_messages_update(&self, id: AddonId) -> bool {
        self.messages_update.contains(&id)
    }

    pub fn requires(&self, id: AddonId, capability: Capability) -> bool {
        let list = match capability {
            Capability::Column => &self.column_api,
            Capability::Filter => &self.filter_api,
            Capability::RecentFolders => &self.recent_folders_api,
            Capability::Attachment => &self.attachment_api,
            Capability::RecipientChanged => &self.recipient_changed_api,
            Capability::StatusBar => &self.status_bar_api,
        };
        list.contains(&id)
    }

    pub fn is_known_compatible(&self, id: AddonId, release: u32) -> bool {
        self.known_compatible
            .get(&release)
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    }

    pub fn is_known_broken(&self, id: AddonId, release: u32) -> bool {
        self.known_broken
            .get(&release)
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    }
}

/// JSON object keys are always strings; parse them as numbers.
fn keyed_by_number<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
    K::Err: std::fmt::Display,
    V: Deserialize<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<K>()
                .map(|k| (k, value))
                .map_err(|e| de::Error::custom(format!("invalid key '{}': {}", key, e)))
        })
        .collect()
}
