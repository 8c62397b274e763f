//! Small helpers shared by the stages.
//!
//! - Display truncation for titles in logs and the console summary
//! - Output directory validation before any work is done

use crate::error::PulseError;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended. Cuts always land on a char boundary.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of characters to keep
///
/// # Returns
///
/// `s` unchanged if it has at most `max` characters, otherwise the first
/// `max` characters with `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Shorten a title for console display: titles over `max` characters are cut
/// and suffixed with `"..."`.
pub fn truncate_title(title: &str, max: usize) -> String {
    match title.char_indices().nth(max) {
        None => title.to_string(),
        Some((cut, _)) => format!("{}...", &title[..cut]),
    }
}

/// Name of the throwaway file used to check a directory for write access.
const WRITE_CHECK_FILE: &str = ".hn_pulse_write_check";

/// Create `path` if needed and check that files can be written into it.
///
/// Run before a stage does any real work so an unwritable output location
/// fails fast instead of after a fetch or a full analysis.
///
/// # Arguments
///
/// * `path` - Output directory (data dir or chart dir)
///
/// # Errors
///
/// Returns [`PulseError::Io`] if the directory cannot be created or a file
/// cannot be written into it. Failing to remove the check file afterwards is
/// only logged.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), PulseError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| PulseError::io(path, e))?;

    let check_file = path.join(WRITE_CHECK_FILE);
    fs::write(&check_file, b"")
        .await
        .map_err(|e| PulseError::io(path, e))?;
    if let Err(e) = fs::remove_file(&check_file).await {
        warn!(file = %check_file.display(), error = %e, "Could not remove write check file");
    }

    debug!("Output directory is writable");
    Ok(())
}
