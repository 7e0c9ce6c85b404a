//! Release labels: supported ESR major versions plus the `current` pseudo-label

use std::fmt;

/// ESR lines the catalog is resolved against, oldest first.
pub const SUPPORTED_ESR: &[u32] = &[60, 68, 78, 91, 102, 115, 128];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseLabel {
    Esr(u32),
    /// Latest published version, regardless of its compatibility window.
    Current,
}

impl ReleaseLabel {
    /// Key used in the `cmp_data` map of a catalog entry.
    pub fn key(&self) -> String {
        match self {
            ReleaseLabel::Esr(major) => major.to_string(),
            ReleaseLabel::Current => "current".to_string(),
        }
    }

    pub fn major(&self) -> Option<u32> {
        match self {
            ReleaseLabel::Esr(major) => Some(*major),
            ReleaseLabel::Current => None,
        }
    }
}

impl fmt::Display for ReleaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseLabel::Esr(major) => write!(f, "{}", major),
            ReleaseLabel::Current => write!(f, "current"),
        }
    }
}

impl From<u32> for ReleaseLabel {
    fn from(major: u32) -> Self {
        ReleaseLabel::Esr(major)
    }
}

/// Marketing name of an ESR, used in group headers.
pub fn release_nickname(major: u32) -> Option<&'static str> {
    match major {
        115 => Some("Supernova"),
        128 => Some("Nebula"),
        _ => None,
    }
}

/// Header of the report group for one ESR.
pub fn group_header(major: u32) -> String {
    match release_nickname(major) {
        Some(name) => format!("Thunderbird {} reports", name),
        None => format!("Thunderbird {} reports", major),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_keys() {
        assert_eq!(ReleaseLabel::Esr(115).key(), "115");
        assert_eq!(ReleaseLabel::Current.key(), "current");
        assert_eq!(ReleaseLabel::from(91).major(), Some(91));
        assert_eq!(ReleaseLabel::Current.major(), None);
    }

    #[test]
    fn test_group_header() {
        assert_eq!(group_header(128), "Thunderbird Nebula reports");
        assert_eq!(group_header(102), "Thunderbird 102 reports");
    }
}
