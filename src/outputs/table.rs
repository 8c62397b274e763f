//! CSV serialization of cleaned records.
//!
//! The file is the hand-off between the two stages:
//!
//! ```text
//! title,link,score,timestamp
//! "Show HN: A thing, with a comma",https://example.com/,101,2025-05-06 09:30:15
//! ```
//!
//! Each scrape run replaces the whole file; there is no append mode.

use crate::error::PulseError;
use crate::models::{Record, TIMESTAMP_FORMAT};
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the CSV inside the data directory.
pub const DATA_FILE_NAME: &str = "scraped_data.csv";

/// Column header of the CSV file, in order.
pub const CSV_HEADER: [&str; 4] = ["title", "link", "score", "timestamp"];

/// Write `records` to `path`, creating the parent directory if needed and
/// overwriting any existing file.
///
/// # Errors
///
/// Returns [`PulseError::Io`] if the directory or file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(records: &[Record], path: &Path) -> Result<(), PulseError> {
    let bytes = encode_records(records).map_err(|e| PulseError::io(path, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            error!(dir = %parent.display(), error = %e, "Failed to create data dir");
            PulseError::io(parent, e)
        })?;
    }

    fs::write(path, bytes).await.map_err(|e| {
        error!(error = %e, "Failed to write CSV");
        PulseError::io(path, e)
    })?;
    info!("Saved records to CSV");
    Ok(())
}

/// Encode records as CSV bytes, header first.
pub fn encode_records(records: &[Record]) -> Result<Vec<u8>, io::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        let score = record.score.to_string();
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        wtr.write_record([
            record.title.as_str(),
            record.link.as_deref().unwrap_or(""),
            score.as_str(),
            timestamp.as_str(),
        ])?;
    }
    wtr.into_inner().map_err(|e| e.into_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(title: &str, link: Option<&str>, score: u64) -> Record {
        Record {
            title: title.into(),
            link: link.map(str::to_string),
            score,
            timestamp: NaiveDateTime::parse_from_str("2025-05-06 09:30:15", TIMESTAMP_FORMAT)
                .unwrap(),
        }
    }

    #[test]
    fn test_encode_header_and_quoting() {
        let bytes = encode_records(&[
            record("Plain", Some("https://a.example/"), 3),
            record("Commas, \"quotes\"", None, 0),
        ])
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "title,link,score,timestamp");
        assert_eq!(lines[1], "Plain,https://a.example/,3,2025-05-06 09:30:15");
        assert_eq!(lines[2], "\"Commas, \"\"quotes\"\"\",,0,2025-05-06 09:30:15");
    }

    #[test]
    fn test_encode_empty_is_header_only() {
        let text = String::from_utf8(encode_records(&[]).unwrap()).unwrap();
        assert_eq!(text, "title,link,score,timestamp\n");
    }

    #[tokio::test]
    async fn test_write_records_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scraped_data.csv");

        write_records(&[record("First", None, 1), record("Second", None, 2)], &path)
            .await
            .unwrap();
        write_records(&[record("Only", None, 9)], &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Only"));
        assert!(!text.contains("First"));
    }

    #[tokio::test]
    async fn test_write_records_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_records(&[], &blocker.join("scraped_data.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Io { .. }));
    }
}
