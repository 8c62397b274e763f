//! Reading the scrape stage's CSV file back for analysis.
//!
//! The header must match exactly. Individual rows are re-validated on the
//! way in and dropped, not rejected, when they do not hold a usable record.

use crate::error::PulseError;
use crate::models::{Record, TIMESTAMP_FORMAT};
use crate::outputs::table::CSV_HEADER;
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Records loaded from disk, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    pub records: Vec<Record>,
    /// Rows present in the file but dropped as malformed.
    pub dropped_rows: usize,
}

/// Load the CSV file at `path`.
///
/// Rows are re-validated: a row with the wrong number of fields, an empty
/// title, a non-numeric score or an unreadable timestamp is skipped with a
/// warning and counted in [`LoadedTable::dropped_rows`].
///
/// # Errors
///
/// - [`PulseError::MissingData`] when the file does not exist (scrape has not run)
/// - [`PulseError::DataFormat`] when the header is not `title,link,score,timestamp`
/// - [`PulseError::Io`] for any other read failure
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_records(path: &Path) -> Result<LoadedTable, PulseError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PulseError::MissingData {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(PulseError::io(path, e)),
    };

    let table = parse_table(&bytes, path)?;
    info!(
        rows = table.records.len(),
        dropped = table.dropped_rows,
        "Loaded records"
    );
    Ok(table)
}

fn parse_table(bytes: &[u8], path: &Path) -> Result<LoadedTable, PulseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = rdr.headers().map_err(|e| PulseError::DataFormat {
        path: path.to_path_buf(),
        reason: format!("unreadable header: {e}"),
    })?;
    let found: Vec<&str> = headers.iter().map(str::trim).collect();
    if found != CSV_HEADER {
        return Err(PulseError::DataFormat {
            path: path.to_path_buf(),
            reason: format!(
                "expected header {:?}, found {:?}",
                CSV_HEADER.join(","),
                found.join(",")
            ),
        });
    }

    let mut records = Vec::new();
    let mut dropped_rows = 0usize;
    for (idx, row) in rdr.records().enumerate() {
        // Line 1 is the header.
        let line = idx + 2;
        let parsed = row
            .map_err(|e| e.to_string())
            .and_then(|row| parse_row(&row));
        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(line, %reason, "Dropping malformed row");
                dropped_rows += 1;
            }
        }
    }

    Ok(LoadedTable {
        records,
        dropped_rows,
    })
}

fn parse_row(row: &StringRecord) -> Result<Record, String> {
    if row.len() != CSV_HEADER.len() {
        return Err(format!(
            "expected {} fields, found {}",
            CSV_HEADER.len(),
            row.len()
        ));
    }

    let title = row[0].trim();
    if title.is_empty() {
        return Err("empty title".into());
    }
    let link = Some(row[1].trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string);
    let score = row[2]
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("bad score {:?}: {e}", &row[2]))?;
    let timestamp = NaiveDateTime::parse_from_str(row[3].trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("bad timestamp {:?}: {e}", &row[3]))?;

    Ok(Record {
        title: title.to_string(),
        link,
        score,
        timestamp,
    })
}
