//! Lenient version comparison
//!
//! Not semver. Version strings on ATN carry all kinds of suffixes
//! (`1.0b2`, `68.*`, `2.1-beta`), so every run of non-numeric characters is
//! turned into a pseudo segment with a large negative value. That makes
//! `1.0b` sort below `1.0` while never failing on malformed input.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::cmp::Ordering;

lazy_static! {
    static ref NON_NUMERIC_RUN: Regex = Regex::new(r"[^0-9.]+").unwrap();

    // Zero groups in front of a trailing pseudo segment are redundant (1.0.0b == 1b).
    static ref REDUNDANT_ZEROS: Regex =
        Regex::new(r"(?:\.0+)*(\.-[0-9]+)(\.[0-9]+)?\.*$").unwrap();
}

/// Wildcard accepted by ATN and `strict_max_version`, meaning "no limit".
pub const WILDCARD: &str = "*";

/// Compare two version strings. `*` is greater than any concrete version.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (a == WILDCARD, b == WILDCARD) {
        (true, true) => return Ordering::Equal,
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        (false, false) => {}
    }

    let a = segments(a);
    let b = segments(b);
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// `compare_versions` as -1, 0 or 1.
pub fn compare(a: &str, b: &str) -> i32 {
    match compare_versions(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn segments(version: &str) -> Vec<i64> {
    let marked = NON_NUMERIC_RUN.replace_all(version, |caps: &Captures| {
        let pseudo = caps[0]
            .chars()
            .find(|c| c.is_ascii_alphanumeric())
            .map(|c| (c.to_ascii_lowercase() as i64 - 65536).to_string())
            .unwrap_or_default();
        format!(".{}.", pseudo)
    });
    let trimmed = REDUNDANT_ZEROS.replace(&marked, "${1}${2}");

    // Segments that overflow i64 read as 0, like empty ones.
    trimmed
        .split('.')
        .map(|segment| segment.parse::<i64>().unwrap_or(0))
        .collect()
}
