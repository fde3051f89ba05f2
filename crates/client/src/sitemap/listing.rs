//! Content listing parsing.
//!
//! The listing is the blog's `content.json`: an array of posts, each with an
//! optional target path and a loosely formatted publish date. Anything that
//! does not parse degrades to "no item" rather than an error.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One listing entry. Only the target path and the publish date are read;
/// any other field is ignored whatever its type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentItem {
    #[serde(default, deserialize_with = "string_or_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub date: Option<String>,
}

/// A field that is not a JSON string reads as absent instead of failing the item.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl ContentItem {
    /// Target path, if present and non-empty. Used verbatim.
    pub fn target(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Publish date, if present and parseable.
    pub fn published(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_item_date)
    }
}

/// Parse a listing body.
///
/// A body that is not a JSON array yields no items; array elements that are
/// not objects are skipped individually.
pub fn parse_listing(body: &[u8]) -> Vec<ContentItem> {
    let values: Vec<Value> = match serde_json::from_slice(body) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("content listing is not a JSON array: {}", e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ContentItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!("skipping malformed listing item: {}", e);
                None
            }
        })
        .collect()
}

/// Parse dates like `August 13,2025`, `August 13, 2025`, `2025-08-13` or RFC 3339.
pub fn parse_item_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    let spaced = space_before_year(raw);
    NaiveDate::parse_from_str(&spaced, "%B %d, %Y").ok()
}

/// `August 13,2025` -> `August 13, 2025`; anything else is returned as is.
fn space_before_year(raw: &str) -> String {
    match raw.rsplit_once(',') {
        Some((head, year)) if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{head}, {year}")
        }
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let body = br#"[
            {"title": "Hidden beaches", "url": "/blog/hidden-beaches/", "date": "August 13,2025"},
            {"title": "Draft"},
            {"title": "Empty", "url": ""}
        ]"#;
        let items = parse_listing(body);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].target(), Some("/blog/hidden-beaches/"));
        assert_eq!(items[1].target(), None);
        assert_eq!(items[2].target(), None);
    }

    #[test]
    fn test_target_is_used_verbatim() {
        let items = parse_listing(br#"[{"url": " /blog/padded/ "}]"#);
        assert_eq!(items[0].target(), Some(" /blog/padded/ "));
    }

    #[test]
    fn test_parse_listing_not_array() {
        assert!(parse_listing(br#"{"posts": []}"#).is_empty());
        assert!(parse_listing(b"<html>offline</html>").is_empty());
    }

    #[test]
    fn test_parse_listing_skips_non_objects() {
        let items = parse_listing(br#"[42, "post", {"url": 7}, {"url": "/blog/ok/"}]"#);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].target(), None);
        assert_eq!(items[1].target(), Some("/blog/ok/"));
    }

    #[test]
    fn test_mistyped_fields_keep_the_item() {
        let items = parse_listing(br#"[{"title": 2025, "url": "/blog/a/"}, {"url": "/blog/b/", "date": 20250813}]"#);
        let targets: Vec<_> = items.iter().filter_map(ContentItem::target).collect();
        assert_eq!(targets, vec!["/blog/a/", "/blog/b/"]);
        assert_eq!(items[1].date, None);
        assert_eq!(items[1].published(), None);
    }

    #[test]
    fn test_parse_item_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 8, 13).unwrap();
        assert_eq!(parse_item_date("August 13,2025"), Some(expected));
        assert_eq!(parse_item_date("August 13, 2025"), Some(expected));
        assert_eq!(parse_item_date("2025-08-13"), Some(expected));
        assert_eq!(parse_item_date("2025-08-13T09:30:00+08:00"), Some(expected));
    }

    #[test]
    fn test_parse_item_date_rejects_garbage() {
        assert_eq!(parse_item_date(""), None);
        assert_eq!(parse_item_date("soon"), None);
        assert_eq!(parse_item_date("Smarch 40, 2025"), None);
    }
}
