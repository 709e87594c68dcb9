//! Percent and time-duration claims near "change" language.
//!
//! [`MetricMiner`] scans free text for numbers followed by a percent or
//! duration unit, cuts a fixed character window around each match, and
//! keeps the window only when it mentions change vocabulary ("reduced",
//! "saved", "faster", ...). The vocabulary check is what separates an
//! impact claim ("cut review time by 40%") from an incidental number
//! (a price, a date, a rate).
//!
//! Output order is every percent pattern in turn, each in source order,
//! then every time pattern likewise.

use crate::config::MiningConfig;
use crate::models::{ArticleRecord, MetricRow, MetricSnippet, MetricType};
use crate::utils::clean;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static PERCENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b\d+(\.\d+)?\s*%",
        r"\b\d+(\.\d+)?\s*(percent|percentage)\b",
        r"\b\d+(\.\d+)?\s*(percentage points|pp)\b",
    ])
});

static TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b\d+(\.\d+)?\s*(hours?|hrs?)\b",
        r"\b\d+(\.\d+)?\s*(minutes?|mins?)\b",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
        .collect()
}

/// Lowercase terms; a snippet is relevant if it contains any of them.
pub const CHANGE_KEYWORDS: &[&str] = &[
    "increase",
    "increased",
    "increases",
    "improve",
    "improved",
    "improves",
    "improvement",
    "decrease",
    "decreased",
    "decreases",
    "reduce",
    "reduces",
    "reduced",
    "reduction",
    "saved",
    "save",
    "saves",
    "saving",
    "cut",
    "cuts",
    "cutting",
    "faster",
    "slower",
    "less time",
    "more time",
    "time saved",
    "documentation",
    "burden",
    "workload",
    "productivity",
    "efficient",
    "efficiency",
];

/// Whether `snippet` mentions change vocabulary, case-insensitively.
pub fn has_change_context(snippet: &str) -> bool {
    let lower = snippet.to_lowercase();
    CHANGE_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricMiner {
    /// Characters of context on each side of a match.
    window: usize,
    /// Mining stops as soon as this many snippets are collected.
    max_hits: usize,
}

impl Default for MetricMiner {
    fn default() -> Self {
        Self::new(90, 80)
    }
}

impl MetricMiner {
    pub fn new(window: usize, max_hits: usize) -> Self {
        Self { window, max_hits }
    }

    pub fn from_config(config: &MiningConfig) -> Self {
        Self::new(config.context_window, config.max_hits)
    }

    /// Find relevant percent and time claims in `text`.
    ///
    /// Never returns more than `max_hits` snippets, and every snippet
    /// contains at least one [`CHANGE_KEYWORDS`] term.
    pub fn mine(&self, text: &str) -> Vec<MetricSnippet> {
        let mut hits = Vec::new();
        if text.is_empty() || self.max_hits == 0 {
            return hits;
        }

        let families = [
            (MetricType::Percent, &*PERCENT_PATTERNS),
            (MetricType::Time, &*TIME_PATTERNS),
        ];
        for (metric_type, patterns) in families {
            for pattern in patterns {
                for m in pattern.find_iter(text) {
                    let snippet = self.context(text, m.start(), m.end());
                    if let Some(snippet) = snippet.filter(|s| has_change_context(s)) {
                        hits.push(MetricSnippet {
                            metric_type,
                            value: m.as_str().to_string(),
                            snippet,
                        });
                    }
                    if hits.len() >= self.max_hits {
                        debug!(max_hits = self.max_hits, "Snippet cap reached");
                        return hits;
                    }
                }
            }
        }
        hits
    }

    /// Normalized text from `window` characters before `start` to `window`
    /// characters after `end`, clipped to the text.
    fn context(&self, text: &str, start: usize, end: usize) -> Option<String> {
        let from = text[..start]
            .char_indices()
            .rev()
            .take(self.window)
            .last()
            .map_or(start, |(i, _)| i);
        let to = text[end..]
            .char_indices()
            .nth(self.window)
            .map_or(text.len(), |(i, _)| end + i);
        clean(&text[from..to])
    }
}

/// Turn extracted articles into output rows.
///
/// Error records are skipped. For each remaining record the description and
/// body are mined together and the first `max_snippets_per_url` snippets
/// become rows, in mined order.
pub fn build_numbers_table(
    records: &[ArticleRecord],
    miner: &MetricMiner,
    max_snippets_per_url: usize,
) -> Vec<MetricRow> {
    let mut rows = Vec::new();
    for record in records.iter().filter(|r| !r.is_error()) {
        let combined = format!(
            "{}\n\n{}",
            record.description.as_deref().unwrap_or_default(),
            record.body.as_deref().unwrap_or_default()
        );
        let snippets = miner.mine(&combined);
        debug!(url = %record.url, snippets = snippets.len(), "Mined article");
        rows.extend(
            snippets
                .into_iter()
                .take(max_snippets_per_url)
                .map(|s| MetricRow::from_parts(record, s)),
        );
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, description: Option<&str>, body: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            site: "example.com".to_string(),
            title: Some("Title".to_string()),
            author: None,
            published_date: Some("2025-01-01".to_string()),
            description: description.map(str::to_string),
            body: body.map(str::to_string),
            error: None,
        }
    }

    #[test]
    fn test_percent_claim_with_change_word() {
        let miner = MetricMiner::default();
        let hits = miner.mine("Our team reduced review time by 42.5% after adopting the tool.");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metric_type, MetricType::Percent);
        assert_eq!(hits[0].value, "42.5%");
        assert!(hits[0].snippet.contains("reduced"));
    }

    #[test]
    fn test_price_per_hour_is_not_a_claim() {
        let miner = MetricMiner::default();
        assert!(miner.mine("The meeting room costs $42.50 per hour to book.").is_empty());
    }

    #[test]
    fn test_duration_without_change_word_is_filtered() {
        let miner = MetricMiner::default();
        assert!(miner.mine("The flight lasted 3 hours and landed at noon.").is_empty());
    }

    #[test]
    fn test_all_pattern_variants() {
        let miner = MetricMiner::new(20, 80);
        let text = "Productivity rose 12 percent. Efficiency improved 3 percentage points. \
                    Costs cut 4 pp. Staff saved 2 hrs weekly. Meetings 15 mins faster.";
        let hits = miner.mine(text);
        let values: Vec<&str> = hits.iter().map(|s| s.value.as_str()).collect();
        assert!(values.contains(&"12 percent"));
        assert!(values.contains(&"3 percentage"));
        assert!(values.contains(&"3 percentage points"));
        assert!(values.contains(&"4 pp"));
        assert!(values.contains(&"2 hrs"));
        assert!(values.contains(&"15 mins"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let miner = MetricMiner::default();
        let hits = miner.mine("Work got FASTER: 20 MINUTES saved per task, a 10 PERCENT gain.");
        let values: Vec<_> = hits.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(values, vec!["10 PERCENT", "20 MINUTES"]);
    }

    #[test]
    fn test_percent_before_time_then_source_order() {
        let miner = MetricMiner::default();
        let text = "It saved 30 minutes. Output increased 5%. Another 2 hours saved. Then 7% faster.";
        let hits = miner.mine(text);
        let got: Vec<(MetricType, &str)> = hits
            .iter()
            .map(|h| (h.metric_type, h.value.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (MetricType::Percent, "5%"),
                (MetricType::Percent, "7%"),
                (MetricType::Time, "2 hours"),
                (MetricType::Time, "30 minutes"),
            ]
        );
    }

    #[test]
    fn test_window_is_clipped_and_normalized() {
        let miner = MetricMiner::new(10, 80);
        let text = "aaaaaaaaaaaaaaaaaaaa   it\n\nsaved 5% bbbbbbbbbbbbbbbbbbbb";
        let hits = miner.mine(text);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet, "it saved 5% bbbbbbbbb");
    }

    #[test]
    fn test_window_counts_characters_not_bytes() {
        let miner = MetricMiner::new(4, 80);
        let hits = miner.mine("ééé cut 9% ààà ööö");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet, "cut 9% ààà");
    }

    #[test]
    fn test_zero_window_needs_keyword_in_match() {
        let miner = MetricMiner::new(0, 80);
        assert!(miner.mine("We reduced it by 5%").is_empty());
    }

    #[test]
    fn test_max_hits_is_hard_cap() {
        let miner = MetricMiner::new(30, 3);
        let text = (1..=10)
            .map(|i| format!("costs were cut by {i}% this quarter."))
            .collect::<Vec<_>>()
            .join(" ");
        let hits = miner.mine(&format!("{text} We also saved 4 hours."));
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.metric_type == MetricType::Percent));
        assert!(hits.iter().all(|h| has_change_context(&h.snippet)));
    }

    #[test]
    fn test_every_snippet_has_change_context() {
        let miner = MetricMiner::default();
        let text = "Revenue hit 40% in 2023. Separately, a 2 hour meeting improved morale. \
                    The 9% figure is unrelated to anything. Teams saved 25 minutes daily.";
        for hit in miner.mine(text) {
            assert!(has_change_context(&hit.snippet), "{}", hit.snippet);
        }
    }

    #[test]
    fn test_mining_is_idempotent() {
        let miner = MetricMiner::default();
        let text = "Throughput increased 18% and handling time dropped 12 minutes, a cut of 3 hours weekly.";
        assert_eq!(miner.mine(text), miner.mine(text));
    }

    #[test]
    fn test_empty_text() {
        assert!(MetricMiner::default().mine("").is_empty());
        assert!(MetricMiner::new(90, 0).mine("cut 5%").is_empty());
    }

    #[test]
    fn test_build_numbers_table_caps_per_url_in_order() {
        let body = (1..=10)
            .map(|i| format!("Team {i} reduced effort by {i}%."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let records = vec![record("https://example.com/a", None, Some(&body))];
        let miner = MetricMiner::default();
        assert_eq!(miner.mine(&body).len(), 10);

        let rows = build_numbers_table(&records, &miner, 6);
        assert_eq!(rows.len(), 6);
        let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["1%", "2%", "3%", "4%", "5%", "6%"]);
        assert!(rows.iter().all(|r| r.url == "https://example.com/a"));
        assert!(rows.iter().all(|r| r.title.as_deref() == Some("Title")));
    }

    #[test]
    fn test_build_numbers_table_mines_description_too() {
        let records = vec![record(
            "https://example.com/b",
            Some("Nurses saved 45 minutes per shift."),
            None,
        )];
        let rows = build_numbers_table(&records, &MetricMiner::default(), 6);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metric_type, MetricType::Time);
        assert_eq!(rows[0].value, "45 minutes");
    }

    #[test]
    fn test_build_numbers_table_skips_errors() {
        let records = vec![
            ArticleRecord::failed("https://example.com/x", "HTTP 403"),
            record("https://example.com/y", None, Some("Nothing numeric here.")),
        ];
        assert!(build_numbers_table(&records, &MetricMiner::default(), 6).is_empty());
    }
}
