//! Anchor extraction from index listing pages.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tags may carry a namespace prefix (`<html:a>`) when the page is served as XHTML.
    static ref ANCHOR: Regex =
        Regex::new(r"(?is)<(?:[a-z][a-z0-9_.-]*:)?a\b([^>]*)>(.*?)</(?:[a-z][a-z0-9_.-]*:)?a\s*>").unwrap();
    static ref HREF: Regex =
        Regex::new(r#"(?is)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap();
    static ref INNER_TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
}

/// One file link on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLink {
    /// Link text, trimmed and entity-decoded
    pub filename: String,
    /// Raw link target, entity-decoded
    pub href: String,
}

/// Extract every anchor that has an `href` from a listing page, in document
/// order.
pub fn parse_links(html: &str) -> Vec<IndexLink> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|captures| {
            let attributes = captures.get(1)?.as_str();
            let href = HREF.captures(attributes).and_then(|href| {
                href.get(1).or_else(|| href.get(2)).or_else(|| href.get(3))
            })?;

            let text = captures.get(2).map_or("", |m| m.as_str());
            let text = INNER_TAG.replace_all(text, "");

            Some(IndexLink {
                filename: decode_entities(text.trim()),
                href: decode_entities(href.as_str().trim()),
            })
        })
        .collect()
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
