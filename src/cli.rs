//! Command-line interface definitions for hn_pulse.
//!
//! The two pipeline stages are separate subcommands so each runs as its own
//! process: `scrape` writes the CSV file, `analyze` reads it back and renders
//! charts. Most options can also be supplied through environment variables.

use crate::cleaner::MissingScorePolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for hn_pulse.
///
/// # Examples
///
/// ```sh
/// # Stage 1: fetch the front page and save it
/// hn_pulse scrape
///
/// # Stage 2: analyze the saved file with a custom histogram bucket width
/// hn_pulse analyze --bucket-width 25
///
/// # Keep entries without a score as score 0
/// hn_pulse --data-dir /tmp/hn scrape --missing-score zero
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding the CSV file and the rendered charts
    #[arg(short, long, global = true, env = "HN_PULSE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for the per-stage log files
    #[arg(short, long, global = true, env = "HN_PULSE_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the listing page, extract and clean articles, save them as CSV
    Scrape(ScrapeArgs),
    /// Load the saved CSV, compute statistics and render charts
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Listing page to fetch
    #[arg(long, env = "HN_PULSE_URL", default_value = "https://news.ycombinator.com/")]
    pub url: String,

    /// Give up on the fetch after this many seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// What to do with entries that have no score line
    #[arg(long, value_enum, default_value_t = MissingScorePolicy::Drop)]
    pub missing_score: MissingScorePolicy,
}

/// Analyze options. Unset flags fall back to the config file, then to defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Optional path to a YAML config file (stopwords, chart settings)
    #[arg(short, long, env = "HN_PULSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of top articles to report [default: 5]
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Number of keywords to report and chart [default: 10]
    #[arg(long)]
    pub top_keywords: Option<usize>,

    /// Width of each score histogram bucket [default: 50]
    #[arg(long)]
    pub bucket_width: Option<u64>,

    /// Minimum keyword length in characters [default: 2]
    #[arg(long)]
    pub min_keyword_len: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_scrape_defaults() {
        let cli = Cli::parse_from(["hn_pulse", "scrape"]);

        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.log_dir, PathBuf::from("logs"));
        match cli.command {
            Command::Scrape(args) => {
                assert_eq!(args.url, "https://news.ycombinator.com/");
                assert_eq!(args.timeout_secs, 10);
                assert_eq!(args.missing_score, MissingScorePolicy::Drop);
            }
            other => panic!("expected scrape, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_scrape_missing_score_zero() {
        let cli = Cli::parse_from(["hn_pulse", "scrape", "--missing-score", "zero"]);
        match cli.command {
            Command::Scrape(args) => assert_eq!(args.missing_score, MissingScorePolicy::Zero),
            other => panic!("expected scrape, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_analyze_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "hn_pulse",
            "analyze",
            "--bucket-width",
            "25",
            "-d",
            "/tmp/hn",
        ]);

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/hn"));
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.bucket_width, Some(25));
                assert_eq!(args.top_n, None);
            }
            other => panic!("expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_config_is_analyze_only() {
        let cli = Cli::parse_from(["hn_pulse", "analyze", "-c", "pulse.yaml"]);
        match cli.command {
            Command::Analyze(args) => assert_eq!(args.config, Some(PathBuf::from("pulse.yaml"))),
            other => panic!("expected analyze, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["hn_pulse", "scrape", "--config", "pulse.yaml"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["hn_pulse"]).is_err());
    }
}
