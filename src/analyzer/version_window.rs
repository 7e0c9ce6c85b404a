//! Rules comparing the ATN compatibility window with the packaged
//! `strict_max_version`, all evaluated against the `current` artifact.

use super::annotations::{collect_badges, Annotation, StatusChain};
use super::{ClassifierContext, Rule, SharedRule};
use crate::models::{CatalogEntry, ParsedArtifact, ReleaseLabel, RowData};
use crate::utils::version::{compare_versions, WILDCARD};
use std::cmp::Ordering;

fn current(entry: &CatalogEntry) -> Option<&ParsedArtifact> {
    entry.data(ReleaseLabel::Current)
}

/// Which way ATN's max deviates from the packaged one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMismatch {
    /// ATN max raised above `strict_max_version`.
    Raised,
    /// ATN max reduced below `strict_max_version`; ignored by the app on
    /// install and upgrade.
    Reduced,
}

impl WindowMismatch {
    fn expected(self) -> Ordering {
        match self {
            WindowMismatch::Raised => Ordering::Less,
            WindowMismatch::Reduced => Ordering::Greater,
        }
    }
}

/// `max-atn-value-raised-above-max-xpi-value` and
/// `max-atn-value-reduced-below-max-xpi-value`. Legacy packages are never
/// included.
pub struct VersionWindowRule {
    mismatch: WindowMismatch,
    extras: Vec<Annotation>,
}

impl VersionWindowRule {
    pub fn new(mismatch: WindowMismatch) -> Self {
        Self {
            mismatch,
            extras: Vec::new(),
        }
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }
}

impl Rule for VersionWindowRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(data) = current(entry) else {
            return RowData::excluded();
        };
        let include = data.mext
            && !data.legacy
            && compare_versions(data.strict_max(), data.atn_max()) == self.mismatch.expected();
        if !include {
            return RowData::excluded();
        }

        let mut badges = Vec::new();
        collect_badges(&self.extras, entry, Some(data), ctx, &mut badges);
        RowData::included(badges)
    }
}

/// `valid-<release>-according-to-strict-max-but-atn-value-reduced`: the ATN
/// max was lowered below `release` although the package itself would still
/// install there.
pub struct ManuallyLoweredRule {
    release: u32,
    reduced: SharedRule,
    extras: Vec<Annotation>,
    chain: StatusChain,
}

impl ManuallyLoweredRule {
    /// `reduced` must be the [`WindowMismatch::Reduced`] rule.
    pub fn new(release: u32, reduced: SharedRule) -> Self {
        Self {
            release,
            reduced,
            extras: Vec::new(),
            chain: StatusChain::default(),
        }
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }

    pub fn with_chain(mut self, chain: StatusChain) -> Self {
        self.chain = chain;
        self
    }
}

impl Rule for ManuallyLoweredRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(data) = current(entry) else {
            return RowData::excluded();
        };
        let release = self.release.to_string();
        let include = self.reduced.row_data(entry, ctx).include
            && compare_versions(data.strict_max(), &release) == Ordering::Greater
            && compare_versions(data.atn_max(), &format!("{}.*", release)) == Ordering::Less;
        if !include {
            return RowData::excluded();
        }

        let mut badges = Vec::new();
        collect_badges(&self.extras, entry, Some(data), ctx, &mut badges);
        badges.extend(self.chain.resolve(entry, Some(data), ctx, false));
        RowData::included(badges)
    }
}

/// `experiments-without-upper-limit`: experiments claiming open-ended
/// compatibility on ATN.
pub struct UnboundedExperimentRule {
    extras: Vec<Annotation>,
}

impl UnboundedExperimentRule {
    pub fn new() -> Self {
        Self { extras: Vec::new() }
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }
}

impl Default for UnboundedExperimentRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnboundedExperimentRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        if ctx.lists.is_ignored(entry.id) {
            return RowData::excluded();
        }
        let Some(data) = current(entry) else {
            return RowData::excluded();
        };
        if !(data.mext && data.experiment && data.atn_max() == WILDCARD) {
            return RowData::excluded();
        }

        let mut badges = Vec::new();
        collect_badges(&self.extras, entry, Some(data), ctx, &mut badges);
        RowData::included(badges)
    }
}

/// `pure-webext-with-upper-limit`: pure packages restricted by a max version
/// they do not need.
pub struct PureWithUpperLimitRule {
    extras: Vec<Annotation>,
}

impl PureWithUpperLimitRule {
    pub fn new() -> Self {
        Self { extras: Vec::new() }
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }
}

impl Default for PureWithUpperLimitRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PureWithUpperLimitRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(data) = current(entry) else {
            return RowData::excluded();
        };
        let limited = data.strict_max() != WILDCARD || data.atn_max() != WILDCARD;
        if !(data.is_pure() && limited) {
            return RowData::excluded();
        }

        let mut badges = Vec::new();
        collect_badges(&self.extras, entry, Some(data), ctx, &mut badges);
        RowData::included(badges)
    }
}

/// `lost-pure-webext-with-upper-limit`: pure packages with nothing
/// compatible with `release`, excluding discontinued ones.
pub struct LostPureWithUpperLimitRule {
    release: u32,
    extras: Vec<Annotation>,
    chain: StatusChain,
}

impl LostPureWithUpperLimitRule {
    pub fn new(release: u32) -> Self {
        Self {
            release,
            extras: Vec::new(),
            chain: StatusChain::default(),
        }
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }

    pub fn with_chain(mut self, chain: StatusChain) -> Self {
        self.chain = chain;
        self
    }
}

impl Rule for LostPureWithUpperLimitRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(data) = current(entry) else {
            return RowData::excluded();
        };
        let include = !ctx.lists.is_discontinued(entry.id)
            && entry.data(ReleaseLabel::Esr(self.release)).is_none()
            && data.is_pure();
        if !include {
            return RowData::excluded();
        }

        let mut badges = Vec::new();
        collect_badges(&self.extras, entry, Some(data), ctx, &mut badges);
        badges.extend(self.chain.resolve(entry, Some(data), ctx, false));
        RowData::included(badges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testing::{context, entry, pure_artifact, with_atn, with_strict_max};
    use crate::models::{Badge, BadgeBase};
    use std::sync::Arc;

    fn windowed(strict_max: &str, atn_max: &str) -> ParsedArtifact {
        with_strict_max(
            with_atn(pure_artifact(), "60.0", atn_max, "2024-01-01T00:00:00Z"),
            strict_max,
        )
    }

    #[test]
    fn test_raised_above_strict_max() {
        let ctx = context();
        let e = entry(1, &[("current", "1.0", windowed("70.*", "120.*"))]);
        assert!(VersionWindowRule::new(WindowMismatch::Raised).row_data(&e, &ctx).include);
        assert!(!VersionWindowRule::new(WindowMismatch::Reduced).row_data(&e, &ctx).include);
    }

    #[test]
    fn test_reduced_below_strict_max() {
        let ctx = context();
        let e = entry(1, &[("current", "1.0", windowed("*", "115.*"))]);
        assert!(VersionWindowRule::new(WindowMismatch::Reduced).row_data(&e, &ctx).include);
        assert!(!VersionWindowRule::new(WindowMismatch::Raised).row_data(&e, &ctx).include);
    }

    #[test]
    fn test_legacy_never_mismatches() {
        let ctx = context();
        let mut data = windowed("70.*", "120.*");
        data.legacy = true;
        let e = entry(1, &[("current", "1.0", data)]);
        assert!(!VersionWindowRule::new(WindowMismatch::Raised).row_data(&e, &ctx).include);
    }

    #[test]
    fn test_manually_lowered() {
        let ctx = context();
        let reduced: SharedRule = Arc::new(VersionWindowRule::new(WindowMismatch::Reduced));
        let rule = ManuallyLoweredRule::new(128, reduced).with_chain(StatusChain::new(vec![
            Annotation::PendingPr,
            Annotation::Contacted,
        ]));

        let lowered = entry(1, &[("current", "1.0", windowed("*", "115.*"))]);
        let row = rule.row_data(&lowered, &ctx);
        assert!(row.include);
        assert!(row.badges.is_empty());

        // Package itself refuses to install on 128.
        let capped = entry(2, &[("current", "1.0", windowed("128.*", "115.*"))]);
        assert!(!rule.row_data(&capped, &ctx).include);

        // ATN still allows 128.
        let open = entry(3, &[("current", "1.0", windowed("*", "128.*"))]);
        assert!(!rule.row_data(&open, &ctx).include);
    }

    #[test]
    fn test_unbounded_experiment() {
        let mut ctx = context();
        let mut data = pure_artifact();
        data.experiment = true;
        let e = entry(1, &[("current", "1.0", data.clone())]);

        let rule = UnboundedExperimentRule::new().with_extras(vec![Annotation::KnownCompatible(128)]);
        assert!(rule.row_data(&e, &ctx).include);

        ctx.lists.known_compatible.entry(128).or_default().insert(1);
        assert_eq!(rule.row_data(&e, &ctx).badges, vec![Badge::new(BadgeBase::Compatible)]);

        ctx.lists.ignored.insert(1);
        assert!(!rule.row_data(&e, &ctx).include);

        let bounded = entry(2, &[("current", "1.0", with_atn(data, "60.0", "128.*", ""))]);
        assert!(!rule.row_data(&bounded, &context()).include);
    }

    #[test]
    fn test_pure_with_upper_limit() {
        let ctx = context();
        let rule = PureWithUpperLimitRule::new();
        let unlimited = entry(1, &[("current", "1.0", pure_artifact())]);
        let limited = entry(2, &[("current", "1.0", windowed("128.*", "*"))]);
        assert!(!rule.row_data(&unlimited, &ctx).include);
        assert!(rule.row_data(&limited, &ctx).include);
    }

    #[test]
    fn test_lost_pure() {
        let mut ctx = context();
        let rule = LostPureWithUpperLimitRule::new(128);
        let lost = entry(1, &[("115", "1.0", pure_artifact()), ("current", "1.0", pure_artifact())]);
        let kept = entry(2, &[("128", "2.0", pure_artifact()), ("current", "2.0", pure_artifact())]);
        assert!(rule.row_data(&lost, &ctx).include);
        assert!(!rule.row_data(&kept, &ctx).include);

        ctx.lists.discontinued.insert(1);
        assert!(!rule.row_data(&lost, &ctx).include);
    }
}
