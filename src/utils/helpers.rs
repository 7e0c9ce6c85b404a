//! Helper utility functions

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Check if a permission is a host match pattern rather than an API name
pub fn is_host_permission(s: &str) -> bool {
    s.contains("://") || s == "<all_urls>"
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Escape text for use inside HTML attributes and element content.
/// Newlines become `&#10;` so multi-line tooltips survive in `title`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse an ATN timestamp (`2024-05-01T10:00:00Z`)
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Whether `timestamp` lies at most `days` before `now`.
/// Unparsable timestamps are never recent.
pub fn within_days(timestamp: &str, now: DateTime<Utc>, days: i64) -> bool {
    parse_timestamp(timestamp)
        .map(|then| now - then <= Duration::days(days))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_host_permission() {
        assert!(is_host_permission("https://example.com/*"));
        assert!(is_host_permission("<all_urls>"));
        assert!(is_host_permission("*://*.example.com/*"));
        assert!(!is_host_permission("storage"));
        assert!(!is_host_permission("tabs"));
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("x")));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&'c'"), "a&lt;b&gt;&amp;&#39;c&#39;");
        assert_eq!(escape_html("one\ntwo"), "one&#10;two");
    }

    #[test]
    fn test_within_days() {
        let now = parse_timestamp("2024-06-15T12:00:00Z").unwrap();
        assert!(within_days("2024-06-01T12:00:00Z", now, 14));
        assert!(!within_days("2024-06-01T11:59:59Z", now, 14));
        assert!(!within_days("not a date", now, 14));
    }
}
