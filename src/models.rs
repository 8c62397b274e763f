//! Data models shared by the scrape and analyze stages.
//!
//! - [`RawEntry`]: one listing entry as the extractor found it, possibly incomplete
//! - [`Record`]: a cleaned, validated article ready for the CSV file
//! - [`AggregateStats`]: statistics derived from the loaded table
//!
//! Records are immutable once the cleaner produces them. The CSV file is the
//! only contract between the two stages.

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Timestamp layout used in the CSV `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A listing entry straight out of the extractor.
///
/// The extractor only guarantees a title is present. The score stays `None`
/// when the page carried no score line for this entry (job posts, for
/// example); the cleaner decides whether such entries survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// The identifier joining the title row to its score row, if the row had one.
    pub id: Option<String>,
    pub title: String,
    pub link: Option<String>,
    pub score: Option<u64>,
}

/// One scraped article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    /// Absolute URL of the article, or `None` when the entry had no href.
    pub link: Option<String>,
    pub score: u64,
    /// Local capture time, second precision.
    pub timestamp: NaiveDateTime,
}

/// Summary statistics computed fresh on every analyze run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub total_count: usize,
    /// Arithmetic mean of all scores; `0.0` when there are no records.
    pub average_score: f64,
    pub min_score: Option<u64>,
    pub max_score: Option<u64>,
    pub median_score: Option<f64>,
    /// Highest-scoring records, descending, ties in original row order.
    pub top_n: Vec<Record>,
    /// Every score in row order, kept for the distribution chart.
    pub scores: Vec<u64>,
    pub keyword_counts: HashMap<String, usize>,
}

impl AggregateStats {
    /// True when no records were analyzed.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// The `k` most frequent keywords, most frequent first.
    ///
    /// Ties are broken alphabetically so charts and summaries are stable
    /// across runs over the same data.
    pub fn top_keywords(&self, k: usize) -> Vec<(String, usize)> {
        let mut pairs: Vec<(String, usize)> = self
            .keyword_counts
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(k);
        pairs
    }
}
