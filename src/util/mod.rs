//! Utility functions shared by the fetcher and normalizer.
//!
//! - **URL validation**: feed URLs must be absolute http(s) URLs
//! - **Text processing**: HTML → plain-text snippets
//!
//! # Examples
//!
//! ```
//! use articlesync::util::{html_to_snippet, validate_url};
//!
//! let url = validate_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(url.host_str(), Some("example.com"));
//!
//! assert_eq!(html_to_snippet("<p>Hello &amp; welcome</p>"), "Hello & welcome");
//! ```

mod text;
mod url_validator;

pub use text::html_to_snippet;
pub use url_validator::{validate_url, UrlValidationError};
