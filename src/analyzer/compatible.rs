//! Add-ons ATN reports as compatible with one ESR

use super::annotations::{collect_badges, Annotation};
use super::{ClassifierContext, Rule};
use crate::models::{CatalogEntry, ReleaseLabel, RowData};

/// `atn-tb<release>`: a version resolves for `release`.
///
/// Theme-experiment and purity badges are always appended after the
/// configured extras.
pub struct CompatibleRule {
    release: u32,
    extras: Vec<Annotation>,
}

impl CompatibleRule {
    pub fn new(release: u32) -> Self {
        Self {
            release,
            extras: Vec::new(),
        }
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }
}

impl Rule for CompatibleRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(data) = entry.data(ReleaseLabel::Esr(self.release)) else {
            return RowData::excluded();
        };

        let mut badges = Vec::new();
        collect_badges(&self.extras, entry, Some(data), ctx, &mut badges);
        collect_badges(
            &[Annotation::ThemeExperiment, Annotation::Pure],
            entry,
            Some(data),
            ctx,
            &mut badges,
        );
        RowData::included(badges)
    }
}
