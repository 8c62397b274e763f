//! Runtime configuration for the analyze stage.
//!
//! Values resolve in three layers: built-in defaults, then the optional YAML
//! file passed with `--config`, then explicit command-line flags.
//!
//! ```yaml
//! top_n: 5
//! top_keywords: 15
//! bucket_width: 25
//! extra_stopwords: [rust, released]
//! ```

use crate::cli::AnalyzeArgs;
use crate::error::PulseError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Common English words plus listing-site noise ("show", "ask", "via").
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
    "dare", "ought", "used", "it", "its", "this", "that", "these", "those", "i", "you", "he",
    "she", "we", "they", "what", "which", "who", "whom", "whose", "where", "when", "why", "how",
    "all", "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "just", "about", "into", "over",
    "after", "before", "between", "through", "during", "above", "below", "up", "down", "out",
    "off", "again", "then", "once", "here", "there", "any", "your", "my", "his", "her", "our",
    "their", "if", "because", "while", "although", "though", "unless", "until", "since", "now",
    "new", "show", "ask", "get", "got", "make", "vs", "via", "using", "based",
];

pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_TOP_KEYWORDS: usize = 10;
pub const DEFAULT_MIN_KEYWORD_LEN: usize = 2;
pub const DEFAULT_BUCKET_WIDTH: u64 = 50;
pub const DEFAULT_CHART_SIZE: (u32, u32) = (1000, 600);

/// Inputs to the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub stopwords: HashSet<String>,
    pub top_n: usize,
    /// Tokens shorter than this many characters are not counted.
    pub min_keyword_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            top_n: DEFAULT_TOP_N,
            min_keyword_len: DEFAULT_MIN_KEYWORD_LEN,
        }
    }
}

/// Inputs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfig {
    pub bucket_width: u64,
    pub top_keywords: usize,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            bucket_width: DEFAULT_BUCKET_WIDTH,
            top_keywords: DEFAULT_TOP_KEYWORDS,
            width: DEFAULT_CHART_SIZE.0,
            height: DEFAULT_CHART_SIZE.1,
        }
    }
}

/// Shape of the optional YAML config file. Every key may be omitted.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Replaces the built-in stopword list entirely.
    pub stopwords: Option<Vec<String>>,
    /// Added on top of whichever stopword list is in effect.
    pub extra_stopwords: Vec<String>,
    pub top_n: Option<usize>,
    pub top_keywords: Option<usize>,
    pub min_keyword_len: Option<usize>,
    pub bucket_width: Option<u64>,
    pub chart_width: Option<u32>,
    pub chart_height: Option<u32>,
}

/// Read and parse a YAML config file.
///
/// An empty file yields [`FileConfig::default`].
///
/// # Errors
///
/// - [`PulseError::Io`] if the file cannot be read
/// - [`PulseError::Config`] if it is not valid YAML or has unknown keys
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_file_config(path: &Path) -> Result<FileConfig, PulseError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| PulseError::io(path, e))?;
    let parsed = parse_file_config(&raw)
        .map_err(|e| PulseError::Config(format!("{}: {e}", path.display())))?;
    info!("Loaded config file");
    Ok(parsed)
}

fn parse_file_config(raw: &str) -> Result<FileConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(raw)
}

/// Merge defaults, file values and CLI flags into the analyzer and renderer configs.
///
/// # Arguments
///
/// * `file` - Parsed config file, or the default when none was given
/// * `args` - Analyze flags; any flag that is set wins over the file
///
/// # Returns
///
/// The analyzer config and the renderer config, in that order.
///
/// # Errors
///
/// Returns [`PulseError::Config`] for a zero bucket width or a zero chart
/// dimension.
pub fn resolve(
    file: FileConfig,
    args: &AnalyzeArgs,
) -> Result<(AnalysisConfig, ChartConfig), PulseError> {
    let mut analysis = AnalysisConfig::default();
    let mut chart = ChartConfig::default();

    if let Some(words) = file.stopwords {
        analysis.stopwords = words.into_iter().map(|w| w.to_lowercase()).collect();
    }
    analysis
        .stopwords
        .extend(file.extra_stopwords.into_iter().map(|w| w.to_lowercase()));

    analysis.top_n = args.top_n.or(file.top_n).unwrap_or(analysis.top_n);
    analysis.min_keyword_len = args
        .min_keyword_len
        .or(file.min_keyword_len)
        .unwrap_or(analysis.min_keyword_len);

    chart.bucket_width = args
        .bucket_width
        .or(file.bucket_width)
        .unwrap_or(chart.bucket_width);
    chart.top_keywords = args
        .top_keywords
        .or(file.top_keywords)
        .unwrap_or(chart.top_keywords);
    chart.width = file.chart_width.unwrap_or(chart.width);
    chart.height = file.chart_height.unwrap_or(chart.height);

    if chart.bucket_width == 0 {
        return Err(PulseError::Config("bucket_width must be at least 1".into()));
    }
    if chart.width == 0 || chart.height == 0 {
        return Err(PulseError::Config("chart dimensions must be non-zero".into()));
    }

    Ok((analysis, chart))
}
