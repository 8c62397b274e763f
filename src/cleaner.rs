//! Validation and deduplication of extracted entries.
//!
//! The extractor is permissive on purpose; this is where an entry either
//! becomes a [`Record`] or is dropped. Output order is the order entries
//! first appeared on the page.

use crate::models::{RawEntry, Record};
use chrono::{NaiveDateTime, Timelike};
use clap::ValueEnum;
use itertools::Itertools;
use tracing::{debug, info, instrument};

/// How to treat entries that reached the cleaner without a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MissingScorePolicy {
    /// Drop the entry; a record needs a numeric score.
    #[default]
    Drop,
    /// Keep the entry with a score of 0.
    Zero,
}

/// Cleaned records plus what was thrown away getting there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub records: Vec<Record>,
    pub dropped_invalid: usize,
    pub dropped_duplicates: usize,
}

/// Turn extracted entries into unique, valid records stamped with `captured_at`.
///
/// An entry is invalid when its trimmed title is empty, or when it has no
/// score and `policy` is [`MissingScorePolicy::Drop`]. Among valid entries
/// sharing a `(title, link)` key only the first is kept. Invalid entries never
/// claim a key, so a later valid duplicate still gets through.
///
/// # Arguments
///
/// * `raw` - Entries in page order, as extracted
/// * `policy` - What to do with entries that have no score
/// * `captured_at` - Capture time; sub-second precision is dropped
///
/// # Returns
///
/// A [`CleanReport`] with the kept records and how many entries were
/// dropped as invalid or duplicate.
#[instrument(level = "info", skip_all, fields(entries = raw.len(), ?policy))]
pub fn clean(
    raw: Vec<RawEntry>,
    policy: MissingScorePolicy,
    captured_at: NaiveDateTime,
) -> CleanReport {
    let timestamp = captured_at.with_nanosecond(0).unwrap_or(captured_at);
    let total = raw.len();

    let valid: Vec<Record> = raw
        .into_iter()
        .filter_map(|entry| validate(entry, policy, timestamp))
        .collect();
    let dropped_invalid = total - valid.len();

    let valid_count = valid.len();
    let records: Vec<Record> = valid
        .into_iter()
        .unique_by(|r| (r.title.clone(), r.link.clone()))
        .collect();
    let dropped_duplicates = valid_count - records.len();

    info!(
        kept = records.len(),
        dropped_invalid,
        dropped_duplicates,
        "Cleaned entries"
    );
    CleanReport {
        records,
        dropped_invalid,
        dropped_duplicates,
    }
}

fn validate(
    entry: RawEntry,
    policy: MissingScorePolicy,
    timestamp: NaiveDateTime,
) -> Option<Record> {
    let title = entry.title.trim();
    if title.is_empty() {
        debug!(id = ?entry.id, "Dropping entry with empty title");
        return None;
    }

    let score = match (entry.score, policy) {
        (Some(score), _) => score,
        (None, MissingScorePolicy::Zero) => 0,
        (None, MissingScorePolicy::Drop) => {
            debug!(id = ?entry.id, %title, "Dropping entry without score");
            return None;
        }
    };

    let link = entry
        .link
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    Some(Record {
        title: title.to_string(),
        link,
        score,
        timestamp,
    })
}
