//! Polls RSS/Atom feeds and upserts normalized articles into a document store.
//!
//! Data flows strictly one way:
//!
//! 1. [`feed::FeedFetcher`] downloads and parses a feed into raw items
//! 2. [`article::normalize`] turns each item into an [`article::ArticleRecord`]
//! 3. [`pipeline::UpsertSink`] writes each record under a key derived from its link
//!
//! [`pipeline::Pipeline`] wires the three together; the binary runs it on a
//! schedule.

pub mod article;
pub mod config;
pub mod feed;
pub mod pipeline;
pub mod storage;
pub mod util;
