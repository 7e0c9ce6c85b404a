//! Community-maintained replacements for add-ons that stopped working

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub name: String,
    pub link: Option<String>,
}

/// Replacement suggestions keyed by the guid of the original add-on.
#[derive(Debug, Clone, Default)]
pub struct AlternativeData {
    entries: HashMap<String, Vec<Alternative>>,
}

impl AlternativeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, guid: impl Into<String>, alternative: Alternative) {
        self.entries.entry(guid.into()).or_default().push(alternative);
    }

    /// Alternatives for `guid`, `None` if there are none.
    pub fn get(&self, guid: &str) -> Option<&[Alternative]> {
        self.entries
            .get(guid)
            .map(Vec::as_slice)
            .filter(|alts| !alts.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
