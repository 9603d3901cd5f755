use thiserror::Error;

use crate::article::ArticleRecord;
use crate::storage::{DocumentStore, StoreError};

/// Collection every article is written to.
pub const ARTICLES_COLLECTION: &str = "Articles";

/// Derives the document key for an article link.
///
/// Every `/` and `:` becomes `_`, since store keys cannot contain path
/// delimiters. Deterministic; distinct links can collide only if they differ
/// solely in those two characters (e.g. `a/b` and `a:b`).
///
/// # Examples
///
/// ```
/// use articlesync::pipeline::document_key;
///
/// assert_eq!(document_key("https://x.com/1"), "https___x.com_1");
/// ```
pub fn document_key(link: &str) -> String {
    link.replace(['/', ':'], "_")
}

/// Why a single article write did not happen.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The record has an empty link, so there is no key to write under
    #[error("Article has no link; refusing to write under an empty key")]
    MissingLink,
    /// The record could not be encoded as a document body
    #[error("Failed to encode article: {0}")]
    Encode(#[from] serde_json::Error),
    /// The store rejected or failed the write
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of one [`UpsertSink::upsert`] call.
#[derive(Debug)]
pub enum WriteOutcome {
    /// The document at `key` now holds the record
    Written { key: String },
    /// No record was given; nothing to do
    Skipped,
    /// The write did not happen
    Failed {
        key: Option<String>,
        error: SinkError,
    },
}

impl WriteOutcome {
    /// `Written` and `Skipped` both count as success.
    pub fn is_success(&self) -> bool {
        !matches!(self, WriteOutcome::Failed { .. })
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            WriteOutcome::Written { key } => Some(key.as_str()),
            WriteOutcome::Failed { key, .. } => key.as_deref(),
            WriteOutcome::Skipped => None,
        }
    }
}

/// Writes article records into the `Articles` collection of an injected store.
///
/// Writes are full overwrites keyed by [`document_key`], so upserting the same
/// record any number of times leaves the same stored state. Failures are
/// returned as [`WriteOutcome::Failed`], never as `Err` or a panic.
pub struct UpsertSink<S> {
    store: S,
}

impl<S: DocumentStore> UpsertSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upserts `record`, or does nothing for `None`.
    pub async fn upsert(&self, record: Option<&ArticleRecord>) -> WriteOutcome {
        let Some(record) = record else {
            return WriteOutcome::Skipped;
        };

        if record.link.is_empty() {
            return WriteOutcome::Failed {
                key: None,
                error: SinkError::MissingLink,
            };
        }

        let key = document_key(&record.link);

        let body = match serde_json::to_value(record) {
            Ok(body) => body,
            Err(e) => {
                return WriteOutcome::Failed {
                    key: Some(key),
                    error: e.into(),
                }
            }
        };

        match self.store.put(ARTICLES_COLLECTION, &key, &body).await {
            Ok(()) => {
                tracing::trace!(key = %key, "Article written");
                WriteOutcome::Written { key }
            }
            Err(e) => WriteOutcome::Failed {
                key: Some(key),
                error: e.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn record(link: &str) -> ArticleRecord {
        ArticleRecord {
            title: "A".into(),
            link: link.into(),
            summary: String::new(),
            source: "Netlab".into(),
            date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            img_url: Some("https://x.com/i.png".into()),
            category: Some(vec!["tech".into()]),
        }
    }

    #[test]
    fn test_document_key() {
        assert_eq!(document_key("https://x.com/1"), "https___x.com_1");
        assert_eq!(document_key("no-delimiters"), "no-delimiters");
        assert_eq!(document_key(""), "");
    }

    #[test]
    fn test_known_collision() {
        assert_eq!(document_key("a/b"), document_key("a:b"));
    }

    #[tokio::test]
    async fn test_upsert_writes_under_sanitized_key() {
        let sink = UpsertSink::new(MemoryStore::new());
        let outcome = sink.upsert(Some(&record("https://x.com/1"))).await;

        assert!(matches!(&outcome, WriteOutcome::Written { key } if key == "https___x.com_1"));
        let stored = sink
            .store()
            .get(ARTICLES_COLLECTION, "https___x.com_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["source"], "Netlab");
        assert_eq!(stored["link"], "https://x.com/1");
    }

    #[tokio::test]
    async fn test_upsert_twice_is_idempotent() {
        let sink = UpsertSink::new(MemoryStore::new());
        let r = record("https://x.com/1");

        sink.upsert(Some(&r)).await;
        let once = sink.store().get(ARTICLES_COLLECTION, "https___x.com_1").await.unwrap();
        sink.upsert(Some(&r)).await;
        let twice = sink.store().get(ARTICLES_COLLECTION, "https___x.com_1").await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(sink.store().count(ARTICLES_COLLECTION).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_later_write_replaces_earlier() {
        let sink = UpsertSink::new(MemoryStore::new());
        sink.upsert(Some(&record("https://x.com/1"))).await;

        let mut updated = record("https://x.com/1");
        updated.title = "B".into();
        updated.img_url = None;
        sink.upsert(Some(&updated)).await;

        let stored = sink
            .store()
            .get(ARTICLES_COLLECTION, "https___x.com_1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["title"], "B");
        assert!(stored.get("imgUrl").is_none());
    }

    #[tokio::test]
    async fn test_none_is_trivial_success() {
        let sink = UpsertSink::new(MemoryStore::new());
        let outcome = sink.upsert(None).await;

        assert!(matches!(outcome, WriteOutcome::Skipped));
        assert!(outcome.is_success());
        assert_eq!(sink.store().put_calls().await, 0);
    }

    #[tokio::test]
    async fn test_empty_link_is_refused() {
        let sink = UpsertSink::new(MemoryStore::new());
        let outcome = sink.upsert(Some(&record(""))).await;

        assert!(matches!(
            outcome,
            WriteOutcome::Failed {
                key: None,
                error: SinkError::MissingLink
            }
        ));
        assert_eq!(sink.store().put_calls().await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_returned_not_raised() {
        let store = MemoryStore::new();
        store.fail_key("https___x.com_1").await;
        let sink = UpsertSink::new(store);

        let outcome = sink.upsert(Some(&record("https://x.com/1"))).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.key(), Some("https___x.com_1"));
        assert!(matches!(
            outcome,
            WriteOutcome::Failed {
                error: SinkError::Store(StoreError::Rejected { .. }),
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn prop_key_is_deterministic(link in ".*") {
            prop_assert_eq!(document_key(&link), document_key(&link.clone()));
            prop_assert!(!document_key(&link).contains(['/', ':']));
        }

        #[test]
        fn prop_keys_differ_outside_delimiters(
            prefix in "[^/:]*",
            a in "[^/:_]",
            b in "[^/:_]",
            suffix in ".*",
        ) {
            prop_assume!(a != b);
            let left = format!("{prefix}{a}{suffix}");
            let right = format!("{prefix}{b}{suffix}");
            prop_assert_ne!(document_key(&left), document_key(&right));
        }
    }
}
