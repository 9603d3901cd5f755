use regex::Regex;
use std::sync::LazyLock;

/// First `<img>` tag carrying a quoted `src` attribute. Attributes may appear
/// before or after `src`, and quoted values before it may contain `>`;
/// `data-src` and similar do not count.
static IMG_SRC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b(?:[^>"']|"[^"]*"|'[^']*')*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("image pattern is valid")
});

/// Extracts the lead image URL from an article's HTML content.
///
/// Returns:
/// - `None` when there is no content at all (absent or empty)
/// - `Some("")` when content exists but has no `<img src=...>`
/// - `Some(url)` with the first image's `src`, single- or double-quoted
///
/// The URL is returned as written; it is not validated or resolved.
///
/// # Examples
///
/// ```
/// use articlesync::article::extract_image_url;
///
/// let html = r#"<p>text</p><img alt="x" src='http://ex.com/a.png'>more"#;
/// assert_eq!(extract_image_url(Some(html)).as_deref(), Some("http://ex.com/a.png"));
/// assert_eq!(extract_image_url(Some("<p>none</p>")).as_deref(), Some(""));
/// assert_eq!(extract_image_url(None), None);
/// ```
pub fn extract_image_url(content: Option<&str>) -> Option<String> {
    let content = content.filter(|c| !c.is_empty())?;

    let url = IMG_SRC_PATTERN
        .captures(content)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(url)
}
