//! Classification badges and rule results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base badge kinds known to the badge registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeBase {
    Compatible,
    Incompatible,
    AlternativeAvailable,
    PendingPr,
    Contacted,
    BreakingApiChange,
    Wip,
    Investigated,
    Discontinued,
    Unknown,
    Permission,
    ThemeExperiment,
    Pure,
    NoLimitExperiment,
    Experiment,
    AttachmentApi,
    #[serde(rename = "recipientChanged_api")]
    RecipientChangedApi,
    ColumnApi,
    FilterApi,
    RecentFoldersApi,
    StatusBarApi,
}

impl BadgeBase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeBase::Compatible => "compatible",
            BadgeBase::Incompatible => "incompatible",
            BadgeBase::AlternativeAvailable => "alternative_available",
            BadgeBase::PendingPr => "pending_pr",
            BadgeBase::Contacted => "contacted",
            BadgeBase::BreakingApiChange => "breaking_api_change",
            BadgeBase::Wip => "wip",
            BadgeBase::Investigated => "investigated",
            BadgeBase::Discontinued => "discontinued",
            BadgeBase::Unknown => "unknown",
            BadgeBase::Permission => "permission",
            BadgeBase::ThemeExperiment => "theme_experiment",
            BadgeBase::Pure => "pure",
            BadgeBase::NoLimitExperiment => "no_limit_experiment",
            BadgeBase::Experiment => "experiment",
            BadgeBase::AttachmentApi => "attachment_api",
            BadgeBase::RecipientChangedApi => "recipientChanged_api",
            BadgeBase::ColumnApi => "column_api",
            BadgeBase::FilterApi => "filter_api",
            BadgeBase::RecentFoldersApi => "recent_folders_api",
            BadgeBase::StatusBarApi => "status_bar_api",
        }
    }
}

impl fmt::Display for BadgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A base kind, optionally specialized by a suffix (`permission.tabs`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BadgeKind {
    pub base: BadgeBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl BadgeKind {
    pub fn new(base: BadgeBase) -> Self {
        Self { base, suffix: None }
    }

    pub fn with_suffix(base: BadgeBase, suffix: impl Into<String>) -> Self {
        Self {
            base,
            suffix: Some(suffix.into()),
        }
    }
}

impl From<BadgeBase> for BadgeKind {
    fn from(base: BadgeBase) -> Self {
        BadgeKind::new(base)
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            Some(suffix) => write!(f, "{}.{}", self.base, suffix),
            None => write!(f, "{}", self.base),
        }
    }
}

/// One classification fact attached to a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub kind: BadgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl Badge {
    pub fn new(kind: impl Into<BadgeKind>) -> Self {
        Self {
            kind: kind.into(),
            link: None,
            tooltip: None,
        }
    }

    pub fn permission(name: impl Into<String>) -> Self {
        Self::new(BadgeKind::with_suffix(BadgeBase::Permission, name))
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Tooltip carrying a curated note; notes that are URLs also become the
    /// badge link.
    pub fn with_note(self, note: &str) -> Self {
        if note.is_empty() {
            return self;
        }
        let badge = self.with_tooltip(note);
        if note.starts_with("http") {
            badge.with_link(note)
        } else {
            badge
        }
    }
}

/// Result of classifying one catalog entry for one report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowData {
    pub include: bool,
    pub badges: Vec<Badge>,
}

impl RowData {
    pub fn excluded() -> Self {
        Self::default()
    }

    pub fn included(badges: Vec<Badge>) -> Self {
        Self {
            include: true,
            badges,
        }
    }

    pub fn when(include: bool) -> Self {
        Self {
            include,
            badges: Vec::new(),
        }
    }

    pub fn has_badge(&self, base: BadgeBase) -> bool {
        self.badges.iter().any(|b| b.kind.base == base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(BadgeKind::new(BadgeBase::PendingPr).to_string(), "pending_pr");
        assert_eq!(
            BadgeKind::with_suffix(BadgeBase::Permission, "tabs").to_string(),
            "permission.tabs"
        );
        assert_eq!(BadgeBase::RecipientChangedApi.to_string(), "recipientChanged_api");
    }

    #[test]
    fn test_note_links_urls_only() {
        let plain = Badge::new(BadgeBase::Contacted).with_note("Works, needs max version lift");
        assert_eq!(plain.link, None);
        assert_eq!(plain.tooltip.as_deref(), Some("Works, needs max version lift"));

        let url = Badge::new(BadgeBase::Investigated).with_note("https://example.org/issue/1");
        assert_eq!(url.link.as_deref(), Some("https://example.org/issue/1"));
    }
}
