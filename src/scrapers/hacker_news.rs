//! Hacker News front page extraction.
//!
//! The front page splits each article across two sibling table rows:
//!
//! ```html
//! <tr class="athing" id="42">  ... <span class="titleline"><a href="...">Title</a></span>
//! <tr> ... <span class="score" id="score_42">101 points</span>
//! ```
//!
//! Extraction is a two-pass join on that identifier. The first pass collects
//! title lines in document order, the second collects score lines into a map
//! keyed by identifier, and the merge looks each title's identifier up in
//! that map.

use crate::error::PulseError;
use crate::models::RawEntry;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use url::Url;

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr.athing").unwrap());
static TITLE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.titleline > a").unwrap());
static SCORE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.score").unwrap());
static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").unwrap());

const SCORE_ID_PREFIX: &str = "score_";

/// Title half of a listing entry, before its score is joined in.
#[derive(Debug)]
struct TitleLine {
    id: Option<String>,
    title: String,
    link: Option<String>,
}

/// Extract every listing entry from the front page markup.
///
/// Entries without a title are skipped and logged. Entries whose score line
/// is missing or unreadable come through with `score: None`; the cleaner
/// decides what happens to them. Relative links are resolved against
/// `base_url`.
///
/// # Arguments
///
/// * `markup` - HTML of the listing page
/// * `base_url` - URL the page was fetched from
///
/// # Returns
///
/// Partial entries in document order of their title rows.
#[instrument(level = "info", skip_all, fields(base_url = %base_url))]
pub fn extract_entries(markup: &str, base_url: &Url) -> Vec<RawEntry> {
    let document = Html::parse_document(markup);

    let title_lines = collect_title_lines(&document, base_url);
    let scores = collect_scores(&document);

    let entries: Vec<RawEntry> = title_lines
        .into_iter()
        .map(|line| {
            let score = line
                .id
                .as_deref()
                .and_then(|id| scores.get(id).copied().flatten());
            if score.is_none() {
                debug!(id = ?line.id, title = %line.title, "No score for entry");
            }
            RawEntry {
                id: line.id,
                title: line.title,
                link: line.link,
                score,
            }
        })
        .collect();

    info!(count = entries.len(), "Extracted listing entries");
    entries
}

/// First pass: title and link of every entry row, in document order.
fn collect_title_lines(document: &Html, base_url: &Url) -> Vec<TitleLine> {
    let mut lines = Vec::new();
    let mut rows = 0usize;
    for row in document.select(&ROW_SELECTOR) {
        rows += 1;
        match parse_title_row(row, base_url) {
            Ok(line) => lines.push(line),
            Err(e) => warn!(error = %e, "Skipping listing entry"),
        }
    }
    info!(rows, parsed = lines.len(), "Collected title lines");
    lines
}

fn parse_title_row(row: ElementRef<'_>, base_url: &Url) -> Result<TitleLine, PulseError> {
    let id = row
        .value()
        .attr("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    let entry = id.clone().unwrap_or_else(|| "<no id>".to_string());

    let anchor = row
        .select(&TITLE_LINK_SELECTOR)
        .next()
        .ok_or_else(|| PulseError::Parse {
            entry: entry.clone(),
            reason: "no title link".into(),
        })?;

    let title = normalize_whitespace(&anchor.text().collect::<String>());
    if title.is_empty() {
        return Err(PulseError::Parse {
            entry,
            reason: "empty title".into(),
        });
    }

    let link = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_link(base_url, href));

    Ok(TitleLine { id, title, link })
}

/// Second pass: identifier → parsed score, for every score line on the page.
///
/// A score line that cannot be tied to an identifier is logged and ignored.
/// If two lines claim the same identifier the first one wins.
fn collect_scores(document: &Html) -> HashMap<String, Option<u64>> {
    let mut scores = HashMap::new();
    for node in document.select(&SCORE_SELECTOR) {
        let text = node.text().collect::<String>();
        let Some(id) = node
            .value()
            .attr("id")
            .and_then(|raw| raw.strip_prefix(SCORE_ID_PREFIX))
            .filter(|id| !id.is_empty())
        else {
            let e = PulseError::Parse {
                entry: "<score line>".into(),
                reason: format!("score {:?} has no identifier", text.trim()),
            };
            warn!(error = %e, "Ignoring score line");
            continue;
        };

        let parsed = parse_score(&text);
        if parsed.is_none() {
            warn!(%id, text = %truncate_for_log(text.trim(), 40), "Could not parse score");
        }
        scores.entry(id.to_string()).or_insert(parsed);
    }
    debug!(count = scores.len(), "Collected score lines");
    scores
}

/// Parse score text such as `"101 points"` or `"1,234 points"`.
///
/// All non-digit characters are stripped before conversion. Returns `None`
/// when no digits remain or the number does not fit.
pub fn parse_score(text: &str) -> Option<u64> {
    let digits = NON_DIGITS.replace_all(text, "");
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Absolute hrefs are kept verbatim; relative ones are joined onto the page URL.
fn resolve_link(base_url: &Url, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    match base_url.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
