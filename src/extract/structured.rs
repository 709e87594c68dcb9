//! JSON-LD article metadata.
//!
//! Many news and blog templates embed a `script[type="application/ld+json"]`
//! block describing the page. This is the most reliable source of author
//! and date, so the content extractor consults it before any meta tag.

use crate::utils::clean;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// `@type` substrings that mark an object as an article.
const ARTICLE_TYPES: [&str; 4] = ["NewsArticle", "Article", "BlogPosting", "ReportageNewsArticle"];

/// Date keys in order of preference.
const DATE_KEYS: [&str; 3] = ["datePublished", "dateCreated", "dateModified"];

/// Author and date taken from the first article-typed JSON-LD object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleSignals {
    pub author: Option<String>,
    pub published: Option<String>,
}

/// The shapes an `author` value takes in the wild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorField {
    Single(String),
    /// One slot per listed entry; unnamed entries keep their place as `None`.
    Many(Vec<Option<String>>),
    Absent,
}

impl AuthorField {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(obj)) => match obj.get("name").and_then(Value::as_str) {
                Some(name) => AuthorField::Single(name.to_string()),
                None => AuthorField::Absent,
            },
            Some(Value::String(name)) => AuthorField::Single(name.clone()),
            Some(Value::Array(items)) if !items.is_empty() => {
                AuthorField::Many(items.iter().map(entry_name).collect())
            }
            _ => AuthorField::Absent,
        }
    }

    /// The name reported for the article: the first listed author.
    pub fn primary(&self) -> Option<String> {
        match self {
            AuthorField::Single(name) => clean(name),
            AuthorField::Many(names) => names.first().and_then(|n| n.as_deref()).and_then(clean),
            AuthorField::Absent => None,
        }
    }
}

/// A list entry is either a person object or a bare value.
fn entry_name(entry: &Value) -> Option<String> {
    match entry {
        Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Scan all JSON-LD blocks for the first article-typed object.
///
/// Blocks that fail to parse are skipped. Returns empty signals when no
/// article object exists; the first match wins even if it carries neither
/// author nor date.
pub fn article_signals(document: &Html) -> ArticleSignals {
    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(data) = serde_json::from_str::<Value>(raw) else {
            continue;
        };

        if let Some(article) = candidates(&data).into_iter().find(|obj| is_article(obj)) {
            return ArticleSignals {
                author: AuthorField::from_value(article.get("author")).primary(),
                published: first_date(article),
            };
        }
    }
    ArticleSignals::default()
}

/// Top-level objects, array elements, and `@graph` members, in document order.
fn candidates(data: &Value) -> Vec<&Value> {
    let top: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let mut out = Vec::new();
    for value in top {
        if !value.is_object() {
            continue;
        }
        out.push(value);
        if let Some(graph) = value.get("@graph").and_then(Value::as_array) {
            out.extend(graph.iter().filter(|v| v.is_object()));
        }
    }
    out
}

fn is_article(obj: &Value) -> bool {
    let declared = match obj.get("@type") {
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .map(|t| match t {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" "),
        _ => return false,
    };
    ARTICLE_TYPES.iter().any(|t| declared.contains(t))
}

fn first_date(obj: &Value) -> Option<String> {
    DATE_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str).and_then(clean))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signals(ld: &str) -> ArticleSignals {
        let html = format!(
            r#"<html><head><script type="application/ld+json">{ld}</script></head><body></body></html>"#
        );
        article_signals(&Html::parse_document(&html))
    }

    #[test]
    fn test_author_object() {
        let s = signals(
            r#"{"@type": "NewsArticle", "author": {"@type": "Person", "name": "Jane Doe"}, "datePublished": "2025-01-15"}"#,
        );
        assert_eq!(s.author.as_deref(), Some("Jane Doe"));
        assert_eq!(s.published.as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn test_author_list_of_objects_and_strings() {
        let s = signals(r#"{"@type": "BlogPosting", "author": [{"name": "First Author"}, {"name": "Second"}]}"#);
        assert_eq!(s.author.as_deref(), Some("First Author"));

        let s = signals(r#"{"@type": "Article", "author": ["  Plain   Name ", "Other"]}"#);
        assert_eq!(s.author.as_deref(), Some("Plain Name"));
    }

    #[test]
    fn test_author_bare_string() {
        let s = signals(r#"{"@type": "ReportageNewsArticle", "author": "Sam Writer"}"#);
        assert_eq!(s.author.as_deref(), Some("Sam Writer"));
    }

    #[test]
    fn test_unnamed_first_author_is_not_skipped() {
        let s = signals(
            r#"{"@type": "NewsArticle", "author": [{"@type": "Organization"}, {"name": "Second"}]}"#,
        );
        assert_eq!(s.author, None);
    }

    #[test]
    fn test_author_field_shapes() {
        assert_eq!(
            AuthorField::from_value(Some(&json!({"name": "A"}))),
            AuthorField::Single("A".to_string())
        );
        assert_eq!(
            AuthorField::from_value(Some(&json!([{"name": "A"}, "B", 7]))),
            AuthorField::Many(vec![Some("A".to_string()), Some("B".to_string()), Some("7".to_string())])
        );
        assert_eq!(AuthorField::from_value(Some(&json!([]))), AuthorField::Absent);
        assert_eq!(AuthorField::from_value(Some(&json!(42))), AuthorField::Absent);
        assert_eq!(AuthorField::from_value(None), AuthorField::Absent);
        assert_eq!(AuthorField::Absent.primary(), None);
    }

    #[test]
    fn test_date_preference_order() {
        let s = signals(r#"{"@type": "NewsArticle", "dateModified": "2025-03-01", "dateCreated": "2025-02-01"}"#);
        assert_eq!(s.published.as_deref(), Some("2025-02-01"));

        let s = signals(r#"{"@type": "NewsArticle", "datePublished": "", "dateModified": "2025-03-01"}"#);
        assert_eq!(s.published.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_type_list_and_top_level_array() {
        let s = signals(
            r#"[{"@type": "Organization", "name": "Org"}, {"@type": ["Thing", "NewsArticle"], "author": "Lee"}]"#,
        );
        assert_eq!(s.author.as_deref(), Some("Lee"));
    }

    #[test]
    fn test_graph_members_are_searched() {
        let s = signals(
            r#"{"@context": "https://schema.org", "@graph": [{"@type": "WebPage"}, {"@type": "Article", "author": {"name": "Graph Author"}, "datePublished": "2024-11-02"}]}"#,
        );
        assert_eq!(s.author.as_deref(), Some("Graph Author"));
        assert_eq!(s.published.as_deref(), Some("2024-11-02"));
    }

    #[test]
    fn test_non_article_types_ignored() {
        let s = signals(r#"{"@type": "Product", "author": "Nobody", "datePublished": "2020-01-01"}"#);
        assert_eq!(s, ArticleSignals::default());
    }

    #[test]
    fn test_malformed_block_skipped() {
        let html = r#"<html><head>
            <script type="application/ld+json">{ not json </script>
            <script type="application/ld+json">{"@type": "NewsArticle", "author": "Recovered"}</script>
            </head></html>"#;
        let s = article_signals(&Html::parse_document(html));
        assert_eq!(s.author.as_deref(), Some("Recovered"));
    }

    #[test]
    fn test_first_article_wins_even_when_empty() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "NewsArticle"}</script>
            <script type="application/ld+json">{"@type": "NewsArticle", "author": "Later"}</script>
            </head></html>"#;
        let s = article_signals(&Html::parse_document(html));
        assert_eq!(s, ArticleSignals::default());
    }
}
