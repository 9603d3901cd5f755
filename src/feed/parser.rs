use chrono::SecondsFormat;
use feed_rs::model::{Entry, FeedType};
use feed_rs::parser;

use crate::article::RawArticleItem;
use crate::util::html_to_snippet;

/// Parses RSS 0.9x/1.0/2.0, Atom or JSON Feed bytes into raw items, in feed order.
///
/// Returns the `feed-rs` error unchanged for anything that is not a feed.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawArticleItem>, parser::ParseFeedError> {
    let feed = parser::parse(bytes)?;
    let rss = matches!(feed.feed_type, FeedType::RSS0 | FeedType::RSS1 | FeedType::RSS2);
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| entry_to_item(entry, rss))
        .collect())
}

fn entry_to_item(entry: Entry, rss: bool) -> RawArticleItem {
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty());

    // RSS: <description>, then <content:encoded>. Atom/JSON: content, then summary.
    let body = entry.content.and_then(|c| c.body);
    let summary = entry.summary.map(|s| s.content);
    let (primary, fallback) = if rss { (summary, body) } else { (body, summary) };
    let content = primary
        .filter(|c| !c.trim().is_empty())
        .or_else(|| fallback.filter(|c| !c.trim().is_empty()));

    let content_snippet = content
        .as_deref()
        .map(html_to_snippet)
        .filter(|s| !s.is_empty());

    let iso_date = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true));

    let categories: Vec<String> = entry
        .categories
        .into_iter()
        .map(|c| c.term.trim().to_string())
        .filter(|term| !term.is_empty())
        .collect();

    RawArticleItem {
        title: entry.title.map(|t| t.content),
        link,
        content,
        content_snippet,
        iso_date,
        categories: (!categories.is_empty()).then_some(categories),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel>
    <title>Netlab</title>
    <link>https://example.com/</link>
    <description>test</description>
    <item>
        <title>First</title>
        <link>https://example.com/1</link>
        <description><![CDATA[<p>Plain &amp; simple</p>]]></description>
        <content:encoded><![CDATA[<p>Body</p><img src="https://example.com/1.png">]]></content:encoded>
        <pubDate>Mon, 01 May 2023 09:00:00 +0900</pubDate>
        <category>tech</category>
        <category>news</category>
    </item>
    <item>
        <title>Second</title>
        <link>https://example.com/2</link>
        <description><![CDATA[<p>Only a description</p>]]></description>
    </item>
    <item>
        <description>No title, no link</description>
    </item>
    <item>
        <title>Fourth</title>
        <link>https://example.com/4</link>
        <content:encoded><![CDATA[<p>Encoded only</p><img src="https://example.com/4.png">]]></content:encoded>
    </item>
</channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom</title>
    <id>urn:feed</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <entry>
        <title>Atom entry</title>
        <id>urn:entry:1</id>
        <link href="https://example.org/a"/>
        <updated>2024-01-02T03:04:05Z</updated>
        <summary>Summary text</summary>
    </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items_in_order() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].title.as_deref(), Some("First"));
        assert_eq!(items[1].title.as_deref(), Some("Second"));
        assert_eq!(items[3].title.as_deref(), Some("Fourth"));
    }

    #[test]
    fn test_rss_description_preferred_over_content_encoded() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        let first = &items[0];
        assert_eq!(first.link.as_deref(), Some("https://example.com/1"));
        assert_eq!(first.content.as_deref(), Some("<p>Plain &amp; simple</p>"));
        assert_eq!(first.content_snippet.as_deref(), Some("Plain & simple"));
    }

    #[test]
    fn test_rss_content_encoded_used_without_description() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        let fourth = &items[3];
        assert!(fourth.content.as_deref().unwrap().contains("4.png"));
        assert_eq!(fourth.content_snippet.as_deref(), Some("Encoded only"));
    }

    #[test]
    fn test_description_used_without_content() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(
            items[1].content.as_deref(),
            Some("<p>Only a description</p>")
        );
        assert_eq!(items[1].content_snippet.as_deref(), Some("Only a description"));
    }

    #[test]
    fn test_pub_date_becomes_utc_iso() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(
            items[0].iso_date.as_deref(),
            Some("2023-05-01T00:00:00.000Z")
        );
        assert_eq!(items[1].iso_date, None);
    }

    #[test]
    fn test_categories() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(
            items[0].categories,
            Some(vec!["tech".to_string(), "news".to_string()])
        );
        assert_eq!(items[1].categories, None);
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(items[2].title, None);
        assert_eq!(items[2].link, None);
    }

    #[test]
    fn test_parse_atom() {
        let items = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link.as_deref(), Some("https://example.org/a"));
        assert_eq!(items[0].iso_date.as_deref(), Some("2024-01-02T03:04:05.000Z"));
        assert_eq!(items[0].content_snippet.as_deref(), Some("Summary text"));
    }

    #[test]
    fn test_atom_content_preferred_over_summary() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom</title>
    <id>urn:feed</id>
    <updated>2024-01-01T00:00:00Z</updated>
    <entry>
        <title>Atom entry</title>
        <id>urn:entry:1</id>
        <link href="https://example.org/a"/>
        <updated>2024-01-02T03:04:05Z</updated>
        <summary>Summary text</summary>
        <content type="html">&lt;p&gt;Full body&lt;/p&gt;</content>
    </entry>
</feed>"#;
        let items = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(items[0].content.as_deref(), Some("<p>Full body</p>"));
        assert_eq!(items[0].content_snippet.as_deref(), Some("Full body"));
    }

    #[test]
    fn test_empty_channel() {
        let rss = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        assert!(parse_feed(rss.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_malformed() {
        assert!(parse_feed(b"<not valid xml").is_err());
    }
}
