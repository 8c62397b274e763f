//! # hn_pulse
//!
//! Scrapes the Hacker News front page into a CSV file, then computes simple
//! statistics over it and renders them as charts.
//!
//! ## Usage
//!
//! ```sh
//! hn_pulse scrape     # fetch → extract → clean → data/scraped_data.csv
//! hn_pulse analyze    # data/scraped_data.csv → stats → data/*.png
//! ```
//!
//! ## Architecture
//!
//! Two independent stages share nothing but the CSV file:
//! 1. **Scrape**: fetch one listing page, extract entries by joining title and
//!    score rows on their identifier, drop invalid and duplicate entries, and
//!    overwrite the CSV file
//! 2. **Analyze**: load and re-validate the CSV file, compute counts, mean,
//!    top articles and keyword frequencies, print a summary, render two charts
//!
//! Each stage logs to stderr and to its own append-only file in the log dir.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

mod analyzer;
mod cleaner;
mod cli;
mod config;
mod error;
mod loader;
mod logging;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::{AnalyzeArgs, Cli, Command, ScrapeArgs};
use config::FileConfig;
use error::PulseError;
use logging::{Stage, StageLogger};
use outputs::charts::render_charts;
use outputs::summary::render_summary;
use outputs::table::{write_records, DATA_FILE_NAME};
use utils::ensure_writable_dir;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let stage = match cli.command {
        Command::Scrape(_) => Stage::Scrape,
        Command::Analyze(_) => Stage::Analyze,
    };

    let logger = StageLogger::new(&cli.log_dir, stage)?;
    logger.in_scope(|| info!(log_file = %logger.log_path().display(), "Logging to file"));
    run(cli, stage)
        .with_subscriber(logger.dispatch().clone())
        .await?;
    Ok(())
}

/// Run one stage end to end, logging how it went.
async fn run(cli: Cli, stage: Stage) -> Result<(), PulseError> {
    let start_time = Instant::now();
    info!("{}", "=".repeat(50));
    info!(?stage, version = env!("CARGO_PKG_VERSION"), "hn_pulse starting");
    debug!(data_dir = %cli.data_dir.display(), log_dir = %cli.log_dir.display(), "Parsed CLI arguments");

    let result = match cli.command {
        Command::Scrape(args) => scrape(&cli.data_dir, args).await,
        Command::Analyze(args) => analyze(&cli.data_dir, args).await,
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Stage failed"),
    }
    info!("{}", "=".repeat(50));
    result
}

/// Stage 1: fetch → extract → clean → write.
///
/// Nothing is written unless the fetch succeeds and at least one record
/// survives cleaning, so a failed run leaves the previous file in place.
#[instrument(level = "info", skip_all, fields(url = %args.url))]
async fn scrape(data_dir: &Path, args: ScrapeArgs) -> Result<(), PulseError> {
    let base_url = Url::parse(&args.url)
        .map_err(|e| PulseError::Config(format!("invalid url {:?}: {e}", args.url)))?;

    // Fail before touching the network if the output can't be written.
    ensure_writable_dir(data_dir).await?;

    let markup =
        scrapers::fetch::fetch_listing(&args.url, Duration::from_secs(args.timeout_secs)).await?;
    let raw = scrapers::hacker_news::extract_entries(&markup, &base_url);
    let report = cleaner::clean(raw, args.missing_score, Local::now().naive_local());

    if report.records.is_empty() {
        warn!("No articles found; leaving existing data file untouched");
        println!("\n[WARN] No articles found on {}", args.url);
        return Ok(());
    }

    let path = data_dir.join(DATA_FILE_NAME);
    write_records(&report.records, &path).await?;

    println!("\n[OK] Successfully scraped {} articles!", report.records.len());
    println!("[OK] Data saved to: {}", path.display());
    Ok(())
}

/// Stage 2: load → analyze → summarize → render.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
async fn analyze(data_dir: &Path, args: AnalyzeArgs) -> Result<(), PulseError> {
    let file_config = match args.config.as_deref() {
        Some(path) => config::load_file_config(path).await?,
        None => FileConfig::default(),
    };
    let (analysis_config, chart_config) = config::resolve(file_config, &args)?;
    debug!(?chart_config, stopwords = analysis_config.stopwords.len(), "Resolved config");

    let table = loader::load_records(&data_dir.join(DATA_FILE_NAME)).await?;
    if table.dropped_rows > 0 {
        warn!(dropped = table.dropped_rows, "Some rows were malformed and skipped");
    }

    let stats = analyzer::analyze(&table.records, &analysis_config);
    println!("\n{}", render_summary(&stats, chart_config.top_keywords));

    let paths = render_charts(&stats, &chart_config, data_dir).await?;
    println!("[CHART] Score distribution chart saved to: {}", paths.score_distribution.display());
    println!("[CHART] Keyword frequency chart saved to: {}", paths.keyword_frequency.display());
    println!("\n[OK] All analysis steps completed successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::MissingScorePolicy;
    use crate::outputs::charts::{KEYWORD_CHART_FILE, SCORE_CHART_FILE};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const FRONT_PAGE: &str = r#"<html><body><table>
        <tr class="athing submission" id="101"><td><span class="titleline"><a href="https://rust-lang.org/">Rust 2.0 announced</a></span></td></tr>
        <tr><td class="subtext"><span class="score" id="score_101">250 points</span></td></tr>
        <tr class="athing submission" id="102"><td><span class="titleline"><a href="item?id=102">Ask HN: Favorite Rust crates?</a></span></td></tr>
        <tr><td class="subtext"><span class="score" id="score_102">1,024 points</span></td></tr>
        <tr class="athing submission" id="103"><td><span class="titleline"><a href="https://jobs.example/">Acme is hiring</a></span></td></tr>
        <tr><td class="subtext"><span class="age">1 hour ago</span></td></tr>
        <tr class="athing submission" id="104"><td><span class="titleline"><a href="https://rust-lang.org/">Rust 2.0 announced</a></span></td></tr>
        <tr><td class="subtext"><span class="score" id="score_104">3 points</span></td></tr>
    </table></body></html>"#;

    async fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/")
    }

    fn scrape_args(url: String) -> ScrapeArgs {
        ScrapeArgs {
            url,
            timeout_secs: 5,
            missing_score: MissingScorePolicy::Drop,
        }
    }

    #[tokio::test]
    async fn test_scrape_then_analyze() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_once(FRONT_PAGE).await;

        scrape(dir.path(), scrape_args(url.clone())).await.unwrap();

        let table = loader::load_records(&dir.path().join(DATA_FILE_NAME))
            .await
            .unwrap();
        let got: Vec<_> = table
            .records
            .iter()
            .map(|r| (r.title.as_str(), r.link.as_deref(), r.score))
            .collect();
        let item_link = format!("{url}item?id=102");
        assert_eq!(
            got,
            vec![
                ("Rust 2.0 announced", Some("https://rust-lang.org/"), 250),
                ("Ask HN: Favorite Rust crates?", Some(item_link.as_str()), 1024),
            ]
        );

        analyze(dir.path(), AnalyzeArgs::default()).await.unwrap();
        assert!(dir.path().join(SCORE_CHART_FILE).exists());
        assert!(dir.path().join(KEYWORD_CHART_FILE).exists());
    }

    #[tokio::test]
    async fn test_scrape_network_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = scrape(dir.path(), scrape_args(format!("http://{addr}/")))
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Network { .. }));
        assert!(!dir.path().join(DATA_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_scrape_rejects_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = scrape(dir.path(), scrape_args("not a url".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Config(_)));
    }

    #[tokio::test]
    async fn test_analyze_before_scrape_is_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = analyze(dir.path(), AnalyzeArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::MissingData { .. }));
    }

    #[tokio::test]
    async fn test_analyze_uses_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DATA_FILE_NAME),
            "title,link,score,timestamp\nRust rocks,https://a/,5,2025-05-06 09:30:15\n",
        )
        .unwrap();
        let config_path = dir.path().join("pulse.yaml");
        std::fs::write(&config_path, "bucket_width: 0\n").unwrap();

        let args = AnalyzeArgs {
            config: Some(config_path),
            ..AnalyzeArgs::default()
        };
        let err = analyze(dir.path(), args)
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Config(_)));
    }
}
