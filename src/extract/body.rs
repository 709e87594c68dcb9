//! Article body assembly from a generic content container.

use super::element_text;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Likely content containers, most specific signal first.
const CONTAINER_SELECTORS: [&str; 7] = [
    "article",
    "main article",
    "main",
    ".article-body",
    ".article-content",
    ".entry-content",
    "#article-body",
];

/// Paragraphs that are page chrome rather than article text.
const BOILERPLATE: [&str; 3] = ["advertisement", "subscribe", "sign up"];

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTAINER_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

static PHOTO_CREDIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bvia getty\b|\b/getty\b").unwrap());

/// First element matching any container selector, tried in order.
pub fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    CONTAINERS
        .iter()
        .find_map(|sel| document.select(sel).next())
}

/// Build the body text of `document`.
///
/// Returns `None` when no container matches; an article without a
/// recognizable container yields no body rather than page chrome.
pub fn extract_body(document: &Html) -> Option<String> {
    let container = find_container(document)?;

    let mut paragraphs: Vec<String> = container
        .select(&PARAGRAPH)
        .filter_map(element_text)
        .filter(|text| !BOILERPLATE.contains(&text.to_lowercase().as_str()))
        .collect();

    if paragraphs.is_empty() {
        return element_text(container);
    }

    if paragraphs.len() > 1 && PHOTO_CREDIT.is_match(&paragraphs[0].to_lowercase()) {
        paragraphs.remove(0);
    }

    Some(paragraphs.join("\n\n"))
}
