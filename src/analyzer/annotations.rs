//! Badge sources shared by the rules
//!
//! An [`Annotation`] looks at one entry (and optionally one of its artifacts)
//! and yields at most one badge. Rules append independent annotations one
//! after another, or run a [`StatusChain`] where only the first hit counts.

use super::{ClassifierContext, SharedRule};
use crate::models::{Badge, BadgeBase, Capability, CatalogEntry, ParsedArtifact};

#[derive(Clone)]
pub enum Annotation {
    Discontinued,
    Investigated,
    PendingPr,
    /// Contacted note as tooltip.
    Contacted,
    /// Contacted note as tooltip; a note that is a URL is also the link.
    ContactedLinked,
    /// Listed as calling `messages.update()` without `messagesUpdate`.
    BreakingApiChange,
    Wip,
    AlternativeAvailable,
    Experiment,
    ThemeExperiment,
    Pure,
    Requires(Capability),
    KnownCompatible(u32),
    KnownBroken(u32),
    /// Cross-reference to another report the entry is part of.
    LinkedReport {
        rule: SharedRule,
        badge: BadgeBase,
        link: String,
    },
}

impl Annotation {
    /// Badge linking to `report`'s page when its rule includes the entry.
    pub fn linked(rule: &SharedRule, badge: BadgeBase, report: &str) -> Self {
        Annotation::LinkedReport {
            rule: SharedRule::clone(rule),
            badge,
            link: format!("{}.html", report),
        }
    }

    pub fn evaluate(
        &self,
        entry: &CatalogEntry,
        data: Option<&ParsedArtifact>,
        ctx: &ClassifierContext,
    ) -> Option<Badge> {
        let lists = &ctx.lists;
        let id = entry.id;
        match self {
            Annotation::Discontinued => lists
                .is_discontinued(id)
                .then(|| Badge::new(BadgeBase::Discontinued)),
            Annotation::Investigated => lists
                .investigated(id)
                .map(|note| Badge::new(BadgeBase::Investigated).with_note(note)),
            Annotation::PendingPr => lists
                .pending_pr(id)
                .map(|url| Badge::new(BadgeBase::PendingPr).with_link(url)),
            Annotation::Contacted => lists.contacted(id).map(|note| {
                let badge = Badge::new(BadgeBase::Contacted);
                if note.is_empty() {
                    badge
                } else {
                    badge.with_tooltip(note)
                }
            }),
            Annotation::ContactedLinked => lists
                .contacted(id)
                .map(|note| Badge::new(BadgeBase::Contacted).with_note(note)),
            Annotation::BreakingApiChange => lists.needs_messages_update(id).then(|| {
                Badge::new(BadgeBase::BreakingApiChange)
                    .with_tooltip("Missing messagesUpdate permission")
            }),
            Annotation::Wip => lists.is_wip(id).then(|| Badge::new(BadgeBase::Wip)),
            Annotation::AlternativeAvailable => ctx
                .alternatives
                .get(&entry.guid)
                .map(|_| Badge::new(BadgeBase::AlternativeAvailable)),
            Annotation::Experiment => data
                .filter(|d| d.experiment)
                .map(|_| Badge::new(BadgeBase::Experiment)),
            Annotation::ThemeExperiment => data
                .filter(|d| d.has_theme_experiment())
                .map(|_| Badge::new(BadgeBase::ThemeExperiment)),
            Annotation::Pure => data
                .filter(|d| d.is_pure())
                .map(|_| Badge::new(BadgeBase::Pure)),
            Annotation::Requires(capability) => lists
                .requires(id, *capability)
                .then(|| Badge::new(capability_badge(*capability))),
            Annotation::KnownCompatible(release) => lists
                .is_known_compatible(id, *release)
                .then(|| Badge::new(BadgeBase::Compatible)),
            Annotation::KnownBroken(release) => lists
                .is_known_broken(id, *release)
                .then(|| Badge::new(BadgeBase::Incompatible)),
            Annotation::LinkedReport { rule, badge, link } => rule
                .row_data(entry, ctx)
                .include
                .then(|| Badge::new(*badge).with_link(link.as_str())),
        }
    }
}

fn capability_badge(capability: Capability) -> BadgeBase {
    match capability {
        Capability::Column => BadgeBase::ColumnApi,
        Capability::Filter => BadgeBase::FilterApi,
        Capability::RecentFolders => BadgeBase::RecentFoldersApi,
        Capability::Attachment => BadgeBase::AttachmentApi,
        Capability::RecipientChanged => BadgeBase::RecipientChangedApi,
        Capability::StatusBar => BadgeBase::StatusBarApi,
    }
}

/// Append the badge of every matching annotation, in order.
pub fn collect_badges(
    annotations: &[Annotation],
    entry: &CatalogEntry,
    data: Option<&ParsedArtifact>,
    ctx: &ClassifierContext,
    badges: &mut Vec<Badge>,
) {
    badges.extend(
        annotations
            .iter()
            .filter_map(|annotation| annotation.evaluate(entry, data, ctx)),
    );
}

/// Priority-ordered status lookup: the first matching annotation wins.
#[derive(Clone, Default)]
pub struct StatusChain {
    order: Vec<Annotation>,
    unknown_fallback: bool,
}

impl StatusChain {
    pub fn new(order: Vec<Annotation>) -> Self {
        Self {
            order,
            unknown_fallback: false,
        }
    }

    /// Emit `unknown` when nothing in the chain matches.
    pub fn or_unknown(mut self) -> Self {
        self.unknown_fallback = true;
        self
    }

    /// At most one status badge. `settled` suppresses the `unknown`
    /// fallback when the entry's fate is already known (discontinued).
    pub fn resolve(
        &self,
        entry: &CatalogEntry,
        data: Option<&ParsedArtifact>,
        ctx: &ClassifierContext,
        settled: bool,
    ) -> Option<Badge> {
        self.order
            .iter()
            .find_map(|annotation| annotation.evaluate(entry, data, ctx))
            .or_else(|| {
                (self.unknown_fallback && !settled).then(|| Badge::new(BadgeBase::Unknown))
            })
    }
}
