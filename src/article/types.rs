use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Raw Feed Items
// ============================================================================

/// One entry of a fetched feed, before normalization.
///
/// Every field is optional: publishers omit fields freely and the fetcher
/// does not invent values. Field names on the wire follow the classic
/// RSS-parser output (`contentSnippet`, `isoDate`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArticleItem {
    pub title: Option<String>,
    /// Absolute article URL. The only field downstream identity depends on.
    pub link: Option<String>,
    /// Raw HTML body. RSS: the description, else `content:encoded`.
    /// Atom/JSON: the content, else the summary.
    pub content: Option<String>,
    /// Plain-text rendering of `content`.
    pub content_snippet: Option<String>,
    /// Publication instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`, when the feed had one.
    pub iso_date: Option<String>,
    pub categories: Option<Vec<String>>,
}

// ============================================================================
// Canonical Records
// ============================================================================

/// Canonical article as written to the `Articles` collection.
///
/// `date`, `img_url` and `category` are typed optionals in memory. On the
/// wire they keep the stored-document shape:
///
/// | field      | absent          | present            |
/// |------------|-----------------|--------------------|
/// | `date`     | `""`            | RFC 3339 string    |
/// | `imgUrl`   | field omitted   | string (may be "") |
/// | `category` | `""`            | array of strings   |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// Caller-supplied feed label, never taken from feed content.
    pub source: String,
    #[serde(
        serialize_with = "serialize_date",
        deserialize_with = "deserialize_date",
        default
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "imgUrl", default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(
        serialize_with = "serialize_category",
        deserialize_with = "deserialize_category",
        default
    )]
    pub category: Option<Vec<String>>,
}

/// Accepts either a typed value or the empty-string placeholder.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrEmpty<T> {
    Value(T),
    Empty(#[allow(dead_code)] String),
}

impl<T> OrEmpty<T> {
    fn into_option(self) -> Option<T> {
        match self {
            OrEmpty::Value(v) => Some(v),
            OrEmpty::Empty(_) => None,
        }
    }
}

fn serialize_date<S: Serializer>(date: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => d.serialize(s),
        None => s.serialize_str(""),
    }
}

fn deserialize_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(OrEmpty::<DateTime<Utc>>::deserialize(d)?.into_option())
}

fn serialize_category<S: Serializer>(category: &Option<Vec<String>>, s: S) -> Result<S::Ok, S::Error> {
    match category {
        Some(tags) => tags.serialize(s),
        None => s.serialize_str(""),
    }
}

fn deserialize_category<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(OrEmpty::<Vec<String>>::deserialize(d)?.into_option())
}
