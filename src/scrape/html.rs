//! Tolerant HTML extraction for scholarship pages.
//!
//! Works on raw markup with case-insensitive tag scanning; no DOM is built.
//! Comments, scripts and styles are blanked out (offset-preserving) before any
//! scan so markup inside them is never mistaken for structure.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use reqwest::Url;

/// Placeholder stored when the page has no `<h1 id="page-title">`.
pub const MISSING_HEADING: &str = "H1 element with id 'page-title' not found";
/// Placeholder stored when the heading has no enclosing `<div>`.
pub const MISSING_PARENT: &str = "Parent div not found";

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
});
static PAGE_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<h1\b[^>]*?\bid\s*=\s*(?:"page-title"|'page-title'|page-title\b)[^>]*>"#)
        .unwrap()
});
static DIV_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<(/?)div\b[^>]*>").unwrap());
static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Every `<a href>` on the page, resolved against `page_url`.
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let html = blank_noise(html);

    ANCHOR_RE
        .captures_iter(&html)
        .filter_map(|caps| {
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))?
                .as_str();
            let href = decode_entities(href.trim());
            if href.is_empty() {
                return None;
            }
            if href.starts_with("http://") || href.starts_with("https://") {
                return Some(href);
            }
            base.as_ref()
                .and_then(|b| b.join(&href).ok())
                .map(|u| u.to_string())
        })
        .collect()
}

/// Text of the `<div>` that encloses `<h1 id="page-title">`, or a placeholder
/// when the page does not have that structure.
pub fn page_description(html: &str) -> String {
    let html = blank_noise(html);

    let Some(heading) = PAGE_TITLE_RE.find(&html) else {
        return MISSING_HEADING.to_string();
    };

    // Innermost <div> still open at the heading.
    let mut open: Vec<(usize, usize)> = Vec::new();
    for caps in DIV_TAG_RE.captures_iter(&html[..heading.start()]) {
        let tag = caps.get(0).expect("group 0 always present");
        if caps[1].is_empty() {
            open.push((tag.start(), tag.end()));
        } else {
            open.pop();
        }
    }
    let Some(&(_, content_start)) = open.last() else {
        return MISSING_PARENT.to_string();
    };

    let mut depth = 1usize;
    let mut content_end = html.len();
    for caps in DIV_TAG_RE.captures_iter(&html[content_start..]) {
        let tag = caps.get(0).expect("group 0 always present");
        if caps[1].is_empty() {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                content_end = content_start + tag.start();
                break;
            }
        }
    }

    html_to_text(&html[content_start..content_end])
}

/// Strip tags, decode entities and join text runs with single spaces.
pub fn html_to_text(fragment: &str) -> String {
    let without_noise = blank_noise(fragment);
    let without_tags = TAG_RE.replace_all(&without_noise, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric character references.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    "ndash" => Some('–'),
                    "mdash" => Some('—'),
                    "rsquo" | "lsquo" => Some('\''),
                    "rdquo" | "ldquo" => Some('"'),
                    "hellip" => Some('…'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Replace comments, scripts and styles with spaces of equal byte length.
fn blank_noise(html: &str) -> String {
    NOISE_RE
        .replace_all(html, |caps: &Captures| " ".repeat(caps[0].len()))
        .into_owned()
}
