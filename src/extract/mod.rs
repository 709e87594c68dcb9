//! Generic article extraction.
//!
//! Pages come from arbitrary sites, so there are no per-site rules. Each
//! field is resolved by a cascade: an ordered list of small extractor
//! functions, each returning `Option<String>`. The first present value
//! wins, and a missing signal never stops the other fields from being
//! extracted.
//!
//! | Field | Cascade |
//! |-------|---------|
//! | title | `h1` → `og:title` → `<title>` |
//! | description | `meta[name=description]` → `og:description` |
//! | author | JSON-LD author → `meta[name=author]` → `article:author` |
//! | published date | JSON-LD date → `article:published_time` → `pubdate` → `date` → "Published:" text |
//! | body | see [`body`] |

pub mod body;
pub mod structured;

use crate::models::ArticleRecord;
use crate::utils::{clean, site_of};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use structured::{ArticleSignals, article_signals};

/// Elements whose text is never shown to a reader.
const HIDDEN_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// One step in a field cascade.
type Source = fn(&Page) -> Option<String>;

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());

static PUBLISHED_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Published:\s*([0-9]{1,2}\s+[A-Za-z]{3}\s+[0-9]{4})").unwrap());

/// A parsed document plus the JSON-LD signals, computed once.
struct Page {
    document: Html,
    signals: ArticleSignals,
}

const TITLE_SOURCES: &[Source] = &[heading_title, og_title, document_title];
const DESCRIPTION_SOURCES: &[Source] = &[meta_description, og_description];
const AUTHOR_SOURCES: &[Source] = &[ld_author, meta_author, article_author];
const DATE_SOURCES: &[Source] = &[
    ld_date,
    article_published_time,
    meta_pubdate,
    meta_date,
    published_in_text,
];

/// Extract an [`ArticleRecord`] from raw HTML.
///
/// Deterministic: the same `html` and `url` always produce the same record.
/// The returned record never carries an error; absent signals are `None`.
pub fn extract_article(html: &str, url: &str) -> ArticleRecord {
    let document = Html::parse_document(html);
    let signals = article_signals(&document);
    let page = Page { document, signals };

    ArticleRecord {
        url: url.to_string(),
        site: site_of(url),
        title: first_present(&page, TITLE_SOURCES),
        author: first_present(&page, AUTHOR_SOURCES),
        published_date: first_present(&page, DATE_SOURCES),
        description: first_present(&page, DESCRIPTION_SOURCES),
        body: body::extract_body(&page.document),
        error: None,
    }
}

fn first_present(page: &Page, sources: &[Source]) -> Option<String> {
    sources.iter().find_map(|source| source(page))
}

/// Text of an element: trimmed text nodes joined by spaces, normalized.
pub(crate) fn element_text(element: ElementRef<'_>) -> Option<String> {
    let joined = visible_text(element)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    clean(&joined)
}

/// Text nodes under `element`, minus anything inside a [`HIDDEN_TAGS`] element.
fn visible_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_TAGS.contains(&e.name()))
        });
        (!hidden).then_some(&**text)
    })
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().and_then(element_text)
}

/// `content` of the first `<meta>` whose `attr` equals `value`.
///
/// Only the first such tag is considered, even when its content is empty.
fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
    document
        .select(&META)
        .find(|el| el.value().attr(attr) == Some(value))
        .and_then(|el| el.value().attr("content"))
        .and_then(clean)
}

fn heading_title(page: &Page) -> Option<String> {
    first_text(&page.document, &H1)
}

fn og_title(page: &Page) -> Option<String> {
    meta_content(&page.document, "property", "og:title")
}

fn document_title(page: &Page) -> Option<String> {
    first_text(&page.document, &TITLE)
}

fn meta_description(page: &Page) -> Option<String> {
    meta_content(&page.document, "name", "description")
}

fn og_description(page: &Page) -> Option<String> {
    meta_content(&page.document, "property", "og:description")
}

fn ld_author(page: &Page) -> Option<String> {
    page.signals.author.clone()
}

fn meta_author(page: &Page) -> Option<String> {
    meta_content(&page.document, "name", "author")
}

fn article_author(page: &Page) -> Option<String> {
    meta_content(&page.document, "property", "article:author")
}

fn ld_date(page: &Page) -> Option<String> {
    page.signals.published.clone()
}

fn article_published_time(page: &Page) -> Option<String> {
    meta_content(&page.document, "property", "article:published_time")
}

fn meta_pubdate(page: &Page) -> Option<String> {
    meta_content(&page.document, "name", "pubdate")
}

fn meta_date(page: &Page) -> Option<String> {
    meta_content(&page.document, "name", "date")
}

/// Last resort: a "Published: 12 Mar 2024" line anywhere in the page text.
fn published_in_text(page: &Page) -> Option<String> {
    let text = visible_text(page.document.root_element())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    PUBLISHED_TEXT
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://News.Example.com/2025/05/story";

    const FULL_PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Doc Title | Example</title>
  <meta name="description" content="  A short   description. ">
  <meta property="og:title" content="OG Title">
  <meta property="og:description" content="OG description">
  <meta name="author" content="Meta Author">
  <meta property="article:published_time" content="2025-05-06T10:00:00Z">
  <script type="application/ld+json">
    {"@type": "NewsArticle", "author": {"name": "LD Author"}, "datePublished": "2025-05-05"}
  </script>
</head><body>
  <h1>  Main
     Heading </h1>
  <article>
    <p>Photo via Getty Images</p>
    <p>Teams reduced handling time by 30%.</p>
    <p>Advertisement</p>
    <p>Staff saved 2 hours a week.</p>
  </article>
</body></html>"#;

    #[test]
    fn test_full_page_uses_highest_priority_signals() {
        let record = extract_article(FULL_PAGE, URL);
        assert_eq!(record.url, URL);
        assert_eq!(record.site, "news.example.com");
        assert_eq!(record.title.as_deref(), Some("Main Heading"));
        assert_eq!(record.description.as_deref(), Some("A short description."));
        assert_eq!(record.author.as_deref(), Some("LD Author"));
        assert_eq!(record.published_date.as_deref(), Some("2025-05-05"));
        assert_eq!(
            record.body.as_deref(),
            Some("Teams reduced handling time by 30%.\n\nStaff saved 2 hours a week.")
        );
        assert!(record.error.is_none());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let a = extract_article(FULL_PAGE, URL);
        let b = extract_article(FULL_PAGE, URL);
        assert_eq!(a, b);
    }

    #[test]
    fn test_title_falls_back_to_og_then_title_tag() {
        let html = r#"<html><head><title>Doc</title><meta property="og:title" content="OG"></head><body></body></html>"#;
        assert_eq!(extract_article(html, URL).title.as_deref(), Some("OG"));

        let html = r#"<html><head><title> Doc  Title </title></head><body><h1>   </h1></body></html>"#;
        assert_eq!(extract_article(html, URL).title.as_deref(), Some("Doc Title"));
    }

    #[test]
    fn test_description_falls_back_to_og() {
        let html = r#"<html><head><meta property="og:description" content="From OG"></head></html>"#;
        assert_eq!(
            extract_article(html, URL).description.as_deref(),
            Some("From OG")
        );
    }

    #[test]
    fn test_empty_meta_content_moves_to_next_source() {
        let html = r#"<html><head>
            <meta name="description" content="">
            <meta property="og:description" content="Fallback">
        </head></html>"#;
        assert_eq!(
            extract_article(html, URL).description.as_deref(),
            Some("Fallback")
        );
    }

    #[test]
    fn test_author_meta_fallbacks() {
        let html = r#"<html><head><meta name="author" content="Meta Person"></head></html>"#;
        assert_eq!(extract_article(html, URL).author.as_deref(), Some("Meta Person"));

        let html = r#"<html><head><meta property="article:author" content="Article Person"></head></html>"#;
        assert_eq!(
            extract_article(html, URL).author.as_deref(),
            Some("Article Person")
        );
    }

    #[test]
    fn test_date_meta_fallback_order() {
        let html = r#"<html><head>
            <meta name="date" content="2024-01-03">
            <meta name="pubdate" content="2024-01-02">
        </head></html>"#;
        assert_eq!(
            extract_article(html, URL).published_date.as_deref(),
            Some("2024-01-02")
        );

        let html = r#"<html><head><meta name="date" content="2024-01-03"></head></html>"#;
        assert_eq!(
            extract_article(html, URL).published_date.as_deref(),
            Some("2024-01-03")
        );
    }

    #[test]
    fn test_date_from_published_text() {
        let html = r#"<html><body><div class="byline"><span>Published:</span> <span>12 Mar 2024</span></div></body></html>"#;
        assert_eq!(
            extract_article(html, URL).published_date.as_deref(),
            Some("12 Mar 2024")
        );
    }

    #[test]
    fn test_published_text_ignores_scripts() {
        let html = r#"<html><body>
            <script>var meta = "Published: 01 Jan 2020";</script>
            <p>No date here.</p>
        </body></html>"#;
        assert_eq!(extract_article(html, URL).published_date, None);
    }

    #[test]
    fn test_long_month_name_does_not_match_published_text() {
        let html = r#"<html><body><p>Published: 12 March 2024</p></body></html>"#;
        assert_eq!(extract_article(html, URL).published_date, None);
    }

    #[test]
    fn test_missing_signals_are_absent_not_errors() {
        let record = extract_article("<html><body><div>nothing here</div></body></html>", URL);
        assert_eq!(record.title, None);
        assert_eq!(record.author, None);
        assert_eq!(record.published_date, None);
        assert_eq!(record.description, None);
        assert_eq!(record.body, None);
        assert_eq!(record.error, None);
    }

    #[test]
    fn test_element_text_joins_nodes_with_space() {
        let doc = Html::parse_fragment("<h1>Hello<span>world</span>  !</h1>");
        let h1 = doc.select(&H1).next().unwrap();
        assert_eq!(element_text(h1).as_deref(), Some("Hello world !"));
    }

    #[test]
    fn test_element_text_skips_script_style_and_noscript() {
        let doc = Html::parse_document(
            "<html><body><h1>Visible<script>var x = 1;</script><style>.a{}</style>\
             <noscript><span>enable js</span></noscript> title</h1></body></html>",
        );
        let h1 = doc.select(&H1).next().unwrap();
        assert_eq!(element_text(h1).as_deref(), Some("Visible title"));
    }
}
