use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::image::extract_image_url;
use super::types::{ArticleRecord, RawArticleItem};

/// Converts a raw feed item into the canonical record for `source_label`.
///
/// Pure and total: any combination of missing fields yields a record.
/// Empty strings are treated the same as absent fields.
///
/// - `title`, `link`, `summary` (from `contentSnippet`) default to `""`
/// - `source` is always `source_label`, verbatim
/// - `date` is parsed from `isoDate` only; publisher `pubDate` formats are
///   too inconsistent to trust, so no ISO date means `None`
/// - `category` passes the tag list through, `None` when absent
/// - `img_url` comes from [`extract_image_url`] over `content`
pub fn normalize(item: &RawArticleItem, source_label: &str) -> ArticleRecord {
    ArticleRecord {
        title: text_or_empty(item.title.as_deref()),
        link: text_or_empty(item.link.as_deref()),
        summary: text_or_empty(item.content_snippet.as_deref()),
        source: source_label.to_string(),
        date: item.iso_date.as_deref().and_then(parse_iso_date),
        img_url: extract_image_url(item.content.as_deref()),
        category: item.categories.clone(),
    }
}

fn text_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Parses an ISO-8601 timestamp into a UTC instant.
///
/// Accepts full RFC 3339 (`2023-05-01T00:00:00.000Z`, offsets allowed),
/// offset-less date-times taken as UTC, and bare dates (midnight UTC).
/// Returns `None` for anything else, including the empty string.
pub fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
