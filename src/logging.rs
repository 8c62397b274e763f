//! Per-stage log handles.
//!
//! Each stage logs to stderr and appends to its own file in the log
//! directory (`scraper.log` or `analyzer.log`). The subscriber is built into
//! a [`StageLogger`] value instead of being installed process-wide; the caller
//! scopes a stage's future to it with
//! [`WithSubscriber`](tracing::instrument::WithSubscriber). Stage functions
//! only use the `tracing` macros and run fine in tests with no subscriber.

use crate::error::PulseError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tfmt, EnvFilter};

/// The two pipeline stages, each with its own log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scrape,
    Analyze,
}

impl Stage {
    /// File name of this stage's log inside the log directory.
    pub fn log_file_name(self) -> &'static str {
        match self {
            Stage::Scrape => "scraper.log",
            Stage::Analyze => "analyzer.log",
        }
    }
}

/// A constructed-but-not-installed tracing subscriber for one stage.
///
/// Keep it alive for the whole run: dropping it flushes and closes the log file.
pub struct StageLogger {
    dispatch: Dispatch,
    log_path: PathBuf,
    _guard: WorkerGuard,
}

impl StageLogger {
    /// Build the logger for `stage`, creating `log_dir` if needed.
    ///
    /// The level comes from `RUST_LOG`, defaulting to `info`.
    pub fn new(log_dir: &Path, stage: Stage) -> Result<Self, PulseError> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        Self::with_filter(log_dir, stage, filter)
    }

    /// Build the logger for `stage` with an explicit level filter.
    ///
    /// # Arguments
    ///
    /// * `log_dir` - Directory for the log file, created if missing
    /// * `stage` - Picks the file name ([`Stage::log_file_name`])
    /// * `filter` - Applied to both the stderr and the file layer
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Io`] if the directory or the log file cannot be
    /// created.
    pub fn with_filter(log_dir: &Path, stage: Stage, filter: EnvFilter) -> Result<Self, PulseError> {
        std::fs::create_dir_all(log_dir).map_err(|e| PulseError::io(log_dir, e))?;

        let file_name = stage.log_file_name();
        let log_path = log_dir.join(file_name);
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(log_dir)
            .map_err(|e| PulseError::io(&log_path, io::Error::other(e.to_string())))?;
        let (file_writer, guard) = tracing_appender::non_blocking(appender);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(
                tfmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339()),
            )
            .with(
                tfmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339()),
            );

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            log_path,
            _guard: guard,
        })
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Full path of the file this logger appends to.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Run `f` with this logger as the current subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    #[test]
    fn test_stage_log_file_names() {
        assert_eq!(Stage::Scrape.log_file_name(), "scraper.log");
        assert_eq!(Stage::Analyze.log_file_name(), "analyzer.log");
    }

    #[test]
    fn test_logger_appends_to_stage_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        for run in ["first run", "second run"] {
            let logger =
                StageLogger::with_filter(&log_dir, Stage::Analyze, EnvFilter::new("info")).unwrap();
            logger.in_scope(|| info!(run, "stage message"));
            drop(logger);
        }

        let text = std::fs::read_to_string(log_dir.join("analyzer.log")).unwrap();
        assert!(text.contains("first run"));
        assert!(text.contains("second run"));
        assert_eq!(text.matches("stage message").count(), 2);
    }

    #[test]
    fn test_logger_respects_filter() {
        let dir = tempfile::tempdir().unwrap();
        let logger =
            StageLogger::with_filter(dir.path(), Stage::Scrape, EnvFilter::new("warn")).unwrap();
        let path = logger.log_path().to_path_buf();
        logger.in_scope(|| {
            info!("quiet");
            tracing::warn!("loud");
        });
        drop(logger);

        let text = std::fs::read_to_string(path).unwrap();
        assert!(!text.contains("quiet"));
        assert!(text.contains("loud"));
    }
}
