//! Article data model and the feed-item → record normalizer.
//!
//! - [`types`] - [`RawArticleItem`] as produced by the fetcher and the
//!   canonical [`ArticleRecord`] that gets stored
//! - [`normalize`] - pure conversion between the two, plus date handling
//! - [`image`] - lead-image extraction from HTML content
//!
//! # Example
//!
//! ```
//! use articlesync::article::{normalize, RawArticleItem};
//!
//! let item = RawArticleItem {
//!     title: Some("Hello".into()),
//!     link: Some("https://example.com/1".into()),
//!     ..Default::default()
//! };
//! let record = normalize(&item, "Example");
//! assert_eq!(record.source, "Example");
//! assert!(record.date.is_none());
//! ```

mod image;
mod normalize;
mod types;

pub use image::extract_image_url;
pub use normalize::{normalize, parse_iso_date};
pub use types::{ArticleRecord, RawArticleItem};
