//! Release-independent reports

use super::{ClassifierContext, Rule, SharedRule};
use crate::models::{CatalogEntry, ReleaseLabel, RowData};
use crate::utils::helpers::within_days;
use crate::utils::version::compare_versions;
use std::cmp::Ordering;

/// `all`: compatible with at least one supported release.
pub struct AnyReleaseRule;

impl Rule for AnyReleaseRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        RowData::when(
            ctx.releases
                .iter()
                .any(|&major| entry.resolve(ReleaseLabel::Esr(major)).is_some()),
        )
    }
}

/// `wrong-order`: an older release resolves to a higher version than a newer
/// one. Every pair is checked, not just neighbours.
pub struct WrongOrderRule;

impl Rule for WrongOrderRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let versions: Vec<&str> = entry
            .resolve_all(&ctx.releases)
            .into_iter()
            .filter_map(|(_, resolved)| resolved.map(|r| r.version))
            .collect();

        let inverted = versions.iter().enumerate().any(|(i, low)| {
            versions[i + 1..]
                .iter()
                .any(|high| compare_versions(low, high) == Ordering::Greater)
        });
        RowData::when(inverted)
    }
}

/// `purge-candidates`: nothing resolves above the oldest supported release.
pub struct PurgeCandidateRule;

impl Rule for PurgeCandidateRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let oldest = ctx.oldest_release().unwrap_or(0);
        RowData::when(
            !ctx.releases
                .iter()
                .filter(|&&major| major > oldest)
                .any(|&major| entry.resolve(ReleaseLabel::Esr(major)).is_some()),
        )
    }
}

/// `parsing-error`: the current version could not be unpacked and analysed.
pub struct ParsingErrorRule;

impl Rule for ParsingErrorRule {
    fn row_data(&self, entry: &CatalogEntry, _ctx: &ClassifierContext) -> RowData {
        RowData::when(entry.resolve(ReleaseLabel::Current).is_none())
    }
}

/// Timestamp a freshness window is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessBasis {
    /// Upload of the current version's first file.
    LatestUpload,
    /// Creation of the catalog entry.
    Created,
}

/// Entries whose reference timestamp lies within `days` of the run time.
/// Only entries with an analysable current version qualify.
pub struct FreshnessRule {
    basis: FreshnessBasis,
    days: i64,
}

impl FreshnessRule {
    pub fn new(basis: FreshnessBasis, days: i64) -> Self {
        Self { basis, days }
    }

    /// `recent-activity`: updated within the last two weeks.
    pub fn recent_activity() -> Self {
        Self::new(FreshnessBasis::LatestUpload, 14)
    }

    /// `recent-addition`: created within the last year.
    pub fn recent_addition() -> Self {
        Self::new(FreshnessBasis::Created, 365)
    }
}

impl Rule for FreshnessRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(current) = entry.data(ReleaseLabel::Current) else {
            return RowData::excluded();
        };
        let timestamp = match self.basis {
            FreshnessBasis::LatestUpload => current.uploaded(),
            FreshnessBasis::Created => entry.created.as_deref(),
        };
        RowData::when(
            timestamp
                .map(|ts| within_days(ts, ctx.now, self.days))
                .unwrap_or(false),
        )
    }
}

/// `latest-current-mismatch`: the newest release with a compatible version
/// does not serve the version ATN reports as current. Entries already in
/// `wrong-order` are left out.
pub struct LatestCurrentMismatchRule {
    wrong_order: SharedRule,
}

impl LatestCurrentMismatchRule {
    pub fn new(wrong_order: SharedRule) -> Self {
        Self { wrong_order }
    }
}

impl Rule for LatestCurrentMismatchRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        if self.wrong_order.row_data(entry, ctx).include {
            return RowData::excluded();
        }
        let highest = entry
            .resolve_all(&ctx.releases)
            .into_iter()
            .filter_map(|(_, resolved)| resolved)
            .last();
        let current = entry.resolve(ReleaseLabel::Current).map(|r| r.version);

        RowData::when(matches!(highest, Some(h) if Some(h.version) != current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testing::{context, entry, pure_artifact, with_atn};
    use std::sync::Arc;

    #[test]
    fn test_wrong_order_adjacent() {
        let ctx = context();
        let e = entry(1, &[("60", "1.0", pure_artifact()), ("68", "0.9", pure_artifact())]);
        assert!(WrongOrderRule.row_data(&e, &ctx).include);
    }

    #[test]
    fn test_wrong_order_distant_pair() {
        let ctx = context();
        let e = entry(
            1,
            &[
                ("60", "3.0", pure_artifact()),
                ("91", "3.5", pure_artifact()),
                ("128", "2.0", pure_artifact()),
            ],
        );
        assert!(WrongOrderRule.row_data(&e, &ctx).include);
    }

    #[test]
    fn test_monotonic_versions_are_in_order() {
        let ctx = context();
        let e = entry(
            1,
            &[
                ("60", "1.0", pure_artifact()),
                ("68", "1.0", pure_artifact()),
                ("78", "2.0", pure_artifact()),
                ("128", "10.0", pure_artifact()),
            ],
        );
        assert!(!WrongOrderRule.row_data(&e, &ctx).include);
    }

    #[test]
    fn test_all_and_purge() {
        let ctx = context();
        let old = entry(1, &[("60", "1.0", pure_artifact())]);
        let fresh = entry(2, &[("115", "1.0", pure_artifact())]);
        let none = entry(3, &[("current", "1.0", pure_artifact())]);

        assert!(AnyReleaseRule.row_data(&old, &ctx).include);
        assert!(AnyReleaseRule.row_data(&fresh, &ctx).include);
        assert!(!AnyReleaseRule.row_data(&none, &ctx).include);

        assert!(PurgeCandidateRule.row_data(&old, &ctx).include);
        assert!(!PurgeCandidateRule.row_data(&fresh, &ctx).include);
        assert!(PurgeCandidateRule.row_data(&none, &ctx).include);
    }

    #[test]
    fn test_parsing_error() {
        let ctx = context();
        assert!(ParsingErrorRule.row_data(&entry(1, &[]), &ctx).include);
        let parsed = entry(2, &[("current", "1.0", pure_artifact())]);
        assert!(!ParsingErrorRule.row_data(&parsed, &ctx).include);
    }

    #[test]
    fn test_recent_activity_window() {
        // now is 2024-06-15T12:00Z
        let ctx = context();
        let recent = with_atn(pure_artifact(), "60.0", "*", "2024-06-05T00:00:00Z");
        let stale = with_atn(pure_artifact(), "60.0", "*", "2024-05-01T00:00:00Z");
        let rule = FreshnessRule::recent_activity();
        assert!(rule.row_data(&entry(1, &[("current", "1.0", recent)]), &ctx).include);
        assert!(!rule.row_data(&entry(2, &[("current", "1.0", stale)]), &ctx).include);
    }

    #[test]
    fn test_recent_addition_needs_current() {
        let ctx = context();
        let mut e = entry(1, &[("current", "1.0", pure_artifact())]);
        e.created = Some("2024-01-10T08:00:00Z".to_string());
        assert!(FreshnessRule::recent_addition().row_data(&e, &ctx).include);

        let mut unparsed = entry(2, &[]);
        unparsed.created = Some("2024-01-10T08:00:00Z".to_string());
        assert!(!FreshnessRule::recent_addition().row_data(&unparsed, &ctx).include);

        e.created = Some("2022-01-10T08:00:00Z".to_string());
        assert!(!FreshnessRule::recent_addition().row_data(&e, &ctx).include);
    }

    #[test]
    fn test_latest_current_mismatch() {
        let ctx = context();
        let rule = LatestCurrentMismatchRule::new(Arc::new(WrongOrderRule));

        let matching = entry(1, &[("115", "2.0", pure_artifact()), ("current", "2.0", pure_artifact())]);
        let mismatched = entry(2, &[("102", "1.0", pure_artifact()), ("current", "3.0", pure_artifact())]);
        let wrong_order = entry(
            3,
            &[
                ("102", "5.0", pure_artifact()),
                ("115", "4.0", pure_artifact()),
                ("current", "6.0", pure_artifact()),
            ],
        );

        assert!(!rule.row_data(&matching, &ctx).include);
        assert!(rule.row_data(&mismatched, &ctx).include);
        assert!(!rule.row_data(&wrong_order, &ctx).include);
        assert!(!rule.row_data(&entry(4, &[]), &ctx).include);
    }
}
