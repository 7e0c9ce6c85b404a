//! Badge descriptors and their shields.io rendering

use crate::error::ReportError;
use crate::models::{Badge, BadgeBase, BadgeKind};
use crate::utils::helpers::escape_html;
use std::collections::HashMap;

const SHIELDS_URL: &str = "https://img.shields.io/badge";

/// Invisible left label used by marker badges.
const BLANK: &str = "⠀";

/// Everything needed to draw one badge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeDescriptor {
    pub left: String,
    pub right: String,
    pub color: String,
    pub tooltip: Option<String>,
}

impl BadgeDescriptor {
    pub fn new(left: &str, right: &str, color: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            color: color.to_string(),
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn image_url(&self) -> String {
        format!(
            "{}/{}-{}-{}.svg",
            SHIELDS_URL,
            shields_escape(&self.left),
            shields_escape(&self.right),
            shields_escape(&self.color)
        )
    }

    /// `<img>` tag, wrapped in a link when one is given.
    pub fn to_html(&self, link: Option<&str>) -> String {
        let title = self
            .tooltip
            .as_deref()
            .map(|t| format!(" title=\"{}\"", escape_html(t)))
            .unwrap_or_default();
        let img = format!("<img src='{}'{}>", self.image_url(), title);
        match link {
            Some(link) => format!("<a href=\"{}\">{}</a>", escape_html(link), img),
            None => img,
        }
    }
}

/// Static badge path segments: dashes and underscores are doubled, spaces
/// percent-encoded.
pub fn shields_escape(text: &str) -> String {
    text.replace('-', "--")
        .replace('_', "__")
        .replace(' ', "%20")
}

/// Lookup from badge kind to descriptor.
///
/// Descriptors are never modified once registered; specializing a kind by
/// its suffix or a badge by its tooltip always works on a copy.
#[derive(Debug, Clone, Default)]
pub struct BadgeRegistry {
    descriptors: HashMap<BadgeBase, BadgeDescriptor>,
}

impl BadgeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Descriptors for every badge the standard reports emit.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        let status = |right: &str, color: &str| BadgeDescriptor::new("Status", right, color);
        let marker = |right: &str, color: &str| BadgeDescriptor::new(BLANK, right, color);

        registry.register(BadgeBase::Compatible, status("Compatible (manually tested)", "darkgreen"));
        registry.register(BadgeBase::Incompatible, status("Incompatible (manually tested)", "c90016"));
        registry.register(BadgeBase::AlternativeAvailable, status("Alternative Available", "darkgreen"));
        registry.register(BadgeBase::PendingPr, status("Pending Pull Request", "darkgreen"));
        registry.register(BadgeBase::Contacted, status("Waiting for Feedback", "green"));
        registry.register(BadgeBase::BreakingApiChange, status("WebExtension API Change", "green"));
        registry.register(BadgeBase::Wip, status("Work in progress", "gold"));
        registry.register(BadgeBase::Investigated, status("Ongoing Analysis", "orange"));
        registry.register(BadgeBase::Discontinued, status("Discontinued", "D3D3D3"));
        registry.register(BadgeBase::Unknown, status("Unknown", "c90016"));

        registry.register(
            BadgeBase::Permission,
            BadgeDescriptor::new("permission", "", "orange").with_tooltip("Requested Permission"),
        );
        registry.register(BadgeBase::ThemeExperiment, marker("Theme Experiment", "blue"));
        registry.register(BadgeBase::Pure, marker("Pure WebExtension", "570861"));
        registry.register(BadgeBase::NoLimitExperiment, marker("Limitless Experiment", "ff8800"));
        registry.register(BadgeBase::Experiment, marker("Experiment (legacy)", "ff8800"));

        registry.register(BadgeBase::AttachmentApi, marker("Attachment API Candidate", "white"));
        registry.register(BadgeBase::RecipientChangedApi, marker("onRecipientChanged API", "white"));
        registry.register(BadgeBase::ColumnApi, marker("Needs Column Support", "darkred"));
        registry.register(BadgeBase::FilterApi, marker("Needs Custom QuickFilter Support", "darkred"));
        registry.register(BadgeBase::RecentFoldersApi, marker("Needs Recent Folders Support", "darkred"));
        registry.register(BadgeBase::StatusBarApi, marker("Needs Status Bar Support", "darkred"));
        registry
    }

    pub fn register(&mut self, base: BadgeBase, descriptor: BadgeDescriptor) {
        self.descriptors.insert(base, descriptor);
    }

    /// Descriptor for `kind`, with the suffix as right-hand text.
    pub fn descriptor(&self, kind: &BadgeKind) -> Result<BadgeDescriptor, ReportError> {
        let mut descriptor = self
            .descriptors
            .get(&kind.base)
            .cloned()
            .ok_or_else(|| ReportError::UnknownBadge(kind.clone()))?;
        if let Some(suffix) = &kind.suffix {
            descriptor.right = suffix.clone();
        }
        Ok(descriptor)
    }

    /// HTML for a badge attached to a row.
    pub fn render(&self, badge: &Badge) -> Result<String, ReportError> {
        let mut descriptor = self.descriptor(&badge.kind)?;
        if let Some(tooltip) = &badge.tooltip {
            descriptor.tooltip = Some(tooltip.clone());
        }
        Ok(descriptor.to_html(badge.link.as_deref()))
    }

    /// HTML for a bare kind, as shown in the statistics table.
    pub fn render_kind(&self, kind: &BadgeKind) -> Result<String, ReportError> {
        Ok(self.descriptor(kind)?.to_html(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shields_escape() {
        assert_eq!(shields_escape("Work in progress"), "Work%20in%20progress");
        assert_eq!(shields_escape("no-limit_x"), "no--limit__x");
    }

    #[test]
    fn test_render_with_link_and_tooltip() {
        let registry = BadgeRegistry::standard();
        let badge = Badge::new(BadgeBase::Contacted)
            .with_tooltip("Asked on <forum> & mail")
            .with_link("https://example.org/t/1");
        assert_eq!(
            registry.render(&badge).unwrap(),
            "<a href=\"https://example.org/t/1\"><img src='https://img.shields.io/badge/Status-Waiting%20for%20Feedback-green.svg' \
             title=\"Asked on &lt;forum&gt; &amp; mail\"></a>"
        );
    }

    #[test]
    fn test_suffix_does_not_leak_into_base() {
        let registry = BadgeRegistry::standard();
        let tabs = registry.descriptor(&BadgeKind::with_suffix(BadgeBase::Permission, "tabs")).unwrap();
        assert_eq!(tabs.right, "tabs");
        assert_eq!(tabs.tooltip.as_deref(), Some("Requested Permission"));

        let tooltip = Badge::permission("storage").with_tooltip("custom");
        registry.render(&tooltip).unwrap();

        let base = registry.descriptor(&BadgeKind::new(BadgeBase::Permission)).unwrap();
        assert_eq!(base.right, "");
        assert_eq!(base.tooltip.as_deref(), Some("Requested Permission"));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let registry = BadgeRegistry::empty();
        let err = registry.render(&Badge::new(BadgeBase::Pure)).unwrap_err();
        assert!(matches!(err, ReportError::UnknownBadge(kind) if kind.base == BadgeBase::Pure));
    }
}
