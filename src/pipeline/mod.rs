//! The fetch → normalize → upsert pipeline.
//!
//! - [`sink`] - key derivation and the best-effort [`UpsertSink`]
//! - [`runner`] - [`Pipeline`], which drives feeds through fetcher, normalizer and sink
//!
//! # Example
//!
//! ```ignore
//! use articlesync::feed::{FeedFetcher, FetcherSettings};
//! use articlesync::pipeline::{Pipeline, UpsertSink};
//! use articlesync::storage::Database;
//!
//! let db = Database::open("articles.db").await?;
//! let fetcher = FeedFetcher::new(FetcherSettings::default())?;
//! let pipeline = Pipeline::new(fetcher, UpsertSink::new(db), 16);
//! let summary = pipeline.run_once(&config.feeds).await;
//! ```

mod runner;
mod sink;

pub use runner::{FeedReport, FeedRunResult, Pipeline, RunSummary};
pub use sink::{document_key, SinkError, UpsertSink, WriteOutcome, ARTICLES_COLLECTION};
