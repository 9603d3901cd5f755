//! Feed retrieval: HTTP download plus RSS/Atom parsing.
//!
//! - [`parser`] - feed bytes → [`RawArticleItem`](crate::article::RawArticleItem)s via `feed-rs`
//! - [`fetcher`] - HTTP retrieval with timeout and size limit, no retries
//!
//! # Example
//!
//! ```ignore
//! use articlesync::feed::{FeedFetcher, FetcherSettings};
//!
//! let fetcher = FeedFetcher::new(FetcherSettings::default())?;
//! let items = fetcher
//!     .fetch("Netlab", "https://rss.itmedia.co.jp/rss/2.0/netlab.xml")
//!     .await?;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{FeedFetcher, FetchError, FetcherSettings, DEFAULT_MAX_FEED_BYTES, DEFAULT_TIMEOUT};
pub use parser::parse_feed;
