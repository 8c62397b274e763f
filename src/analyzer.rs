//! Descriptive statistics over the loaded records.
//!
//! Everything here is pure: no I/O, no printing. Presentation lives in
//! [`crate::outputs::summary`] and [`crate::outputs::charts`].

use crate::config::AnalysisConfig;
use crate::models::{AggregateStats, Record};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

/// Compute [`AggregateStats`] for `records`.
///
/// An empty slice is fine: counts are zero, `average_score` is `0.0` and the
/// optional statistics are `None`.
///
/// # Arguments
///
/// * `records` - Loaded table rows, in file order
/// * `config` - Stopwords, top-N size and minimum keyword length
///
/// # Returns
///
/// An [`AggregateStats`] holding the counts, the score list for the
/// histogram and per-keyword frequencies.
#[instrument(level = "info", skip_all, fields(rows = records.len()))]
pub fn analyze(records: &[Record], config: &AnalysisConfig) -> AggregateStats {
    let scores: Vec<u64> = records.iter().map(|r| r.score).collect();
    let total_count = records.len();

    let average_score = if total_count == 0 {
        0.0
    } else {
        scores.iter().map(|&s| s as f64).sum::<f64>() / total_count as f64
    };

    let keyword_counts = keyword_counts(
        records.iter().map(|r| r.title.as_str()),
        &config.stopwords,
        config.min_keyword_len,
    );

    let stats = AggregateStats {
        total_count,
        average_score,
        min_score: scores.iter().min().copied(),
        max_score: scores.iter().max().copied(),
        median_score: median(&scores),
        top_n: top_by_score(records, config.top_n),
        scores,
        keyword_counts,
    };

    info!(
        total = stats.total_count,
        average = stats.average_score,
        unique_keywords = stats.keyword_counts.len(),
        "Computed statistics"
    );
    stats
}

/// The `n` highest-scoring records, descending. Equal scores keep file order.
pub fn top_by_score(records: &[Record], n: usize) -> Vec<Record> {
    let mut sorted: Vec<&Record> = records.iter().collect();
    // sort_by is stable, which gives the tie-break for free.
    sorted.sort_by(|a, b| b.score.cmp(&a.score));
    sorted.into_iter().take(n).cloned().collect()
}

/// Split `title` on non-alphanumeric characters and lowercase each token.
pub fn tokenize(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Count keyword frequency across `titles`, skipping stopwords and tokens
/// shorter than `min_len` characters.
pub fn keyword_counts<'a>(
    titles: impl IntoIterator<Item = &'a str>,
    stopwords: &HashSet<String>,
    min_len: usize,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for title in titles {
        for token in tokenize(title) {
            if token.chars().count() < min_len || stopwords.contains(&token) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }
    }
    counts
}

fn median(scores: &[u64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(title: &str, score: u64) -> Record {
        Record {
            title: title.into(),
            link: None,
            score,
            timestamp: NaiveDateTime::parse_from_str("2025-05-06 09:30:15", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        }
    }

    fn stopwords(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_keyword_counts_filters_stopwords_case_insensitively() {
        let counts = keyword_counts(
            ["The Rise of Go", "Go is great"],
            &stopwords(&["the", "of", "is"]),
            2,
        );
        let expected: HashMap<String, usize> = [("rise", 1), ("go", 2), ("great", 1)]
            .into_iter()
            .map(|(w, c)| (w.to_string(), c))
            .collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_keyword_counts_min_length_and_punctuation() {
        let counts = keyword_counts(["C++ vs. Rust: a (re)view", "x-ray"], &stopwords(&["vs"]), 2);
        assert_eq!(counts.get("rust"), Some(&1));
        assert_eq!(counts.get("re"), Some(&1));
        assert_eq!(counts.get("view"), Some(&1));
        assert_eq!(counts.get("ray"), Some(&1));
        assert!(!counts.contains_key("c"));
        assert!(!counts.contains_key("a"));
        assert!(!counts.contains_key("x"));
        assert!(!counts.contains_key("vs"));
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("Show HN: GPT-4o's new API").collect();
        assert_eq!(tokens, vec!["show", "hn", "gpt", "4o", "s", "new", "api"]);
    }

    #[test]
    fn test_analyze_empty_table() {
        let stats = analyze(&[], &AnalysisConfig::default());
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.average_score, 0.0);
        assert!(stats.top_n.is_empty());
        assert!(stats.keyword_counts.is_empty());
        assert_eq!(stats.median_score, None);
        assert!(stats.is_empty());
    }

    #[test]
    fn test_analyze_counts_and_mean() {
        let records = vec![record("Alpha", 10), record("Beta", 20), record("Gamma", 33)];
        let stats = analyze(&records, &AnalysisConfig::default());
        assert_eq!(stats.total_count, 3);
        assert!((stats.average_score - 21.0).abs() < 1e-9);
        assert_eq!(stats.min_score, Some(10));
        assert_eq!(stats.max_score, Some(33));
        assert_eq!(stats.median_score, Some(20.0));
        assert_eq!(stats.scores, vec![10, 20, 33]);
    }

    #[test]
    fn test_top_n_descending_with_stable_ties() {
        let records = vec![
            record("a", 5),
            record("b", 9),
            record("c", 5),
            record("d", 1),
            record("e", 9),
            record("f", 5),
            record("g", 0),
        ];
        let top = top_by_score(&records, 5);
        let titles: Vec<&str> = top.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "e", "a", "c", "f"]);
    }

    #[test]
    fn test_top_n_shorter_than_limit() {
        let records = vec![record("a", 1), record("b", 2)];
        let stats = analyze(&records, &AnalysisConfig::default());
        assert_eq!(stats.top_n.len(), 2);
        assert_eq!(stats.top_n[0].title, "b");
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median(&[4, 1, 3, 2]), Some(2.5));
    }
}
