//! Error taxonomy shared by both pipeline stages.
//!
//! Only [`PulseError::Parse`] is recoverable: the extractor logs it for the
//! offending entry and moves on. Every other variant is fatal to the stage
//! that raised it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    /// The listing page could not be fetched (connect, timeout, status, body).
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// One listing entry did not have the expected markup shape.
    #[error("unexpected markup for entry {entry}: {reason}")]
    Parse { entry: String, reason: String },

    /// The tabular file exists but does not follow the expected schema.
    #[error("data format error in {path}: {reason}")]
    DataFormat { path: PathBuf, reason: String },

    /// The tabular file produced by `scrape` is not there yet.
    #[error("data file {path} not found; run `hn_pulse scrape` first")]
    MissingData { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The chart backend failed to draw or encode an image.
    #[error("chart rendering failed for {path}: {reason}")]
    Chart { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl PulseError {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PulseError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`PulseError::Network`] from a reqwest failure, naming the
    /// failure class so logs distinguish timeouts from refused connections.
    pub fn network(url: &str, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            format!("timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else if let Some(status) = err.status() {
            format!("bad status {status}")
        } else {
            err.to_string()
        };
        PulseError::Network {
            url: url.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_tells_user_to_scrape() {
        let err = PulseError::MissingData {
            path: PathBuf::from("data/scraped_data.csv"),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/scraped_data.csv"));
        assert!(msg.contains("scrape"));
    }

    #[test]
    fn test_io_keeps_source() {
        let err = PulseError::io(
            "out/chart.png",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("out/chart.png"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
