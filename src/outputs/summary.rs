//! Plain-text summary printed at the end of an analyze run.

use crate::models::AggregateStats;
use crate::utils::truncate_title;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 60;
const TITLE_WIDTH: usize = 50;
const MAX_BAR: usize = 20;

/// Render the statistics block and the keyword table as console text.
///
/// # Arguments
///
/// * `stats` - Output of the analyzer
/// * `top_keywords` - How many keywords to list
///
/// # Returns
///
/// Multi-line text ready for `println!`. Titles are cut at 50 characters and
/// keyword bars at 20 marks.
pub fn render_summary(stats: &AggregateStats, top_keywords: usize) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, stats, top_keywords);
    out
}

fn write_summary(out: &mut String, stats: &AggregateStats, top_keywords: usize) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{rule}\nBASIC STATISTICS\n{rule}")?;
    writeln!(out, "\n[STAT] Total Articles: {}", stats.total_count)?;
    if stats.is_empty() {
        writeln!(out, "[STAT] Average Score: n/a (no data)")?;
    } else {
        writeln!(out, "[STAT] Average Score: {:.2}", stats.average_score)?;
        if let (Some(min), Some(max), Some(median)) =
            (stats.min_score, stats.max_score, stats.median_score)
        {
            writeln!(out, "[STAT] Min / Median / Max: {min} / {median:.1} / {max}")?;
        }
    }

    writeln!(out, "\n[TOP] Top {} Articles by Score:", stats.top_n.len())?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for record in &stats.top_n {
        writeln!(
            out,
            "  [{:4}] {}",
            record.score,
            truncate_title(&record.title, TITLE_WIDTH)
        )?;
    }

    let keywords = stats.top_keywords(top_keywords);
    writeln!(out, "\n{rule}\nKEYWORD ANALYSIS\n{rule}")?;
    writeln!(
        out,
        "\n[KEYWORDS] Top {} Keywords in Article Titles:",
        keywords.len()
    )?;
    writeln!(out, "{}", "-".repeat(40))?;
    for (rank, (keyword, count)) in keywords.iter().enumerate() {
        let bar = "#".repeat((*count).min(MAX_BAR));
        writeln!(out, "  {:2}. {:15} | {:3} | {}", rank + 1, keyword, count, bar)?;
    }
    Ok(())
}
