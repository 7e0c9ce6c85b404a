//! Add-ons that had a compatible version for one ESR but not the next

use super::annotations::{collect_badges, Annotation, StatusChain};
use super::{ClassifierContext, Rule};
use crate::models::{CatalogEntry, ReleaseLabel, RowData};

/// `lost-tb<from>-to-tb<to>`.
///
/// Badge order: the leading annotations, one status from the chain, then
/// the independent extras. The chain's `unknown` fallback only applies when
/// no leading badge matched. Extras see the artifact that was lost, i.e. the
/// one serving `from`.
pub struct LostRule {
    from: u32,
    to: u32,
    honor_ignore_list: bool,
    leading: Vec<Annotation>,
    chain: StatusChain,
    extras: Vec<Annotation>,
}

impl LostRule {
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            from,
            to,
            honor_ignore_list: false,
            leading: Vec::new(),
            chain: StatusChain::default(),
            extras: Vec::new(),
        }
    }

    pub fn honoring_ignore_list(mut self) -> Self {
        self.honor_ignore_list = true;
        self
    }

    pub fn with_leading(mut self, leading: Vec<Annotation>) -> Self {
        self.leading = leading;
        self
    }

    pub fn with_chain(mut self, chain: StatusChain) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_extras(mut self, extras: Vec<Annotation>) -> Self {
        self.extras = extras;
        self
    }
}

impl Rule for LostRule {
    fn row_data(&self, entry: &CatalogEntry, ctx: &ClassifierContext) -> RowData {
        let Some(lost) = entry.resolve(ReleaseLabel::Esr(self.from)) else {
            return RowData::excluded();
        };
        if entry.resolve(ReleaseLabel::Esr(self.to)).is_some() {
            return RowData::excluded();
        }
        if self.honor_ignore_list && ctx.lists.is_ignored(entry.id) {
            return RowData::excluded();
        }

        let mut badges = Vec::new();
        collect_badges(&self.leading, entry, Some(lost.data), ctx, &mut badges);
        let settled = !badges.is_empty();
        badges.extend(self.chain.resolve(entry, Some(lost.data), ctx, settled));
        collect_badges(&self.extras, entry, Some(lost.data), ctx, &mut badges);

        RowData::included(badges)
    }
}
