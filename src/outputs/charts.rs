//! PNG charts rendered from [`AggregateStats`].
//!
//! Two images are written into the data directory on every analyze run,
//! replacing the previous ones:
//!
//! ```text
//! data/
//! ├── score_distribution.png   # histogram, fixed-width buckets, mean marker
//! └── keyword_frequency.png    # horizontal bars, most frequent at the top
//! ```
//!
//! Output is a function of the stats and the [`ChartConfig`] only. Captions,
//! axis descriptions, tick labels and the legend need the `ttf-labels`
//! feature. Without a font backend plotters cannot draw text at all, so those
//! builds reserve no label areas and draw plain axis lines instead.

use crate::config::ChartConfig;
use crate::error::PulseError;
use crate::models::AggregateStats;
use crate::utils::ensure_writable_dir;
use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

pub const SCORE_CHART_FILE: &str = "score_distribution.png";
pub const KEYWORD_CHART_FILE: &str = "keyword_frequency.png";

const BAR_COLOR: RGBColor = RGBColor(52, 152, 219);
const MEAN_COLOR: RGBColor = RGBColor(231, 76, 60);
const CAPTION_FONT: (&str, u32) = ("sans-serif", 28);
const LABELS: bool = cfg!(feature = "ttf-labels");

/// Upper bound on histogram buckets; wider buckets are used past it.
pub const MAX_BUCKETS: u64 = 200;

/// Where the two charts ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub score_distribution: PathBuf,
    pub keyword_frequency: PathBuf,
}

/// Render both charts into `out_dir`.
///
/// # Arguments
///
/// * `stats` - Output of the analyzer
/// * `config` - Bucket width, keyword count and image size
/// * `out_dir` - Directory the PNG files are written into, created if missing
///
/// # Returns
///
/// The paths of the score histogram and the keyword chart.
///
/// # Errors
///
/// - [`PulseError::Io`] if `out_dir` cannot be created or written
/// - [`PulseError::Chart`] if plotters fails to draw or encode an image
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display()))]
pub async fn render_charts(
    stats: &AggregateStats,
    config: &ChartConfig,
    out_dir: &Path,
) -> Result<ChartPaths, PulseError> {
    ensure_writable_dir(out_dir).await?;

    let paths = ChartPaths {
        score_distribution: out_dir.join(SCORE_CHART_FILE),
        keyword_frequency: out_dir.join(KEYWORD_CHART_FILE),
    };

    draw_score_histogram(stats, config, &paths.score_distribution)
        .map_err(|e| chart_error(&paths.score_distribution, e))?;
    info!(path = %paths.score_distribution.display(), "Score distribution chart saved");

    draw_keyword_bars(stats, config, &paths.keyword_frequency)
        .map_err(|e| chart_error(&paths.keyword_frequency, e))?;
    info!(path = %paths.keyword_frequency.display(), "Keyword frequency chart saved");

    Ok(paths)
}

fn chart_error(path: &Path, e: Box<dyn Error>) -> PulseError {
    error!(path = %path.display(), error = %e, "Chart rendering failed");
    PulseError::Chart {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Group scores into `[lower, upper)` buckets starting at zero.
///
/// Every bucket from zero up to the one holding the maximum score is
/// returned, empty ones included, so the histogram has no gaps. When `width`
/// would need more than [`MAX_BUCKETS`] buckets it is widened until the
/// maximum fits; `upper` saturates at `u64::MAX`.
pub fn score_buckets(scores: &[u64], width: u64) -> Vec<(u64, u64, usize)> {
    let Some(&max) = scores.iter().max() else {
        return Vec::new();
    };
    let mut width = width.max(1);
    if max / width >= MAX_BUCKETS {
        width = max / MAX_BUCKETS + 1;
        debug!(width, max, "Widened score buckets");
    }

    let mut counts = vec![0usize; (max / width) as usize + 1];
    for score in scores {
        counts[(score / width) as usize] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = i as u64 * width;
            (lower, lower.saturating_add(width), count)
        })
        .collect()
}

fn draw_score_histogram(
    stats: &AggregateStats,
    config: &ChartConfig,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let buckets = score_buckets(&stats.scores, config.bucket_width);
    let x_max = buckets
        .last()
        .map_or(config.bucket_width.max(1), |&(_, upper, _)| upper);
    let y_max = buckets.iter().map(|&(_, _, c)| c).max().unwrap_or(0) + 1;

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(15);
    if LABELS {
        builder
            .caption("Score Distribution of Articles", CAPTION_FONT)
            .x_label_area_size(40)
            .y_label_area_size(50);
    }
    let mut chart = builder.build_cartesian_2d(0u64..x_max, 0usize..y_max)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh();
        if LABELS {
            mesh.x_desc("Score").y_desc("Number of Articles");
        }
        mesh.draw()?;
    }
    if !LABELS {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0u64, y_max), (0, 0), (x_max, 0)],
            BLACK,
        )))?;
    }

    chart.draw_series(buckets.iter().map(|&(lower, upper, count)| {
        Rectangle::new([(lower, 0), (upper, count)], BAR_COLOR.filled())
    }))?;

    if !stats.is_empty() {
        let mean = stats.average_score.round() as u64;
        chart
            .draw_series(LineSeries::new(
                vec![(mean, 0), (mean, y_max)],
                MEAN_COLOR.stroke_width(2),
            ))?
            .label(format!("Mean: {:.1}", stats.average_score))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &MEAN_COLOR));
        if LABELS {
            chart
                .configure_series_labels()
                .border_style(&BLACK)
                .background_style(&WHITE.mix(0.8))
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_keyword_bars(
    stats: &AggregateStats,
    config: &ChartConfig,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    // Reversed so the most frequent keyword sits at the top of the y axis.
    let mut keywords = stats.top_keywords(config.top_keywords);
    keywords.reverse();
    let labels: Vec<String> = keywords.iter().map(|(w, _)| w.clone()).collect();
    let slots = keywords.len().max(1);
    let x_max = keywords.iter().map(|&(_, c)| c).max().unwrap_or(0) + 1;

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(15);
    if LABELS {
        builder
            .caption(
                format!("Top {} Keywords in Article Titles", keywords.len()),
                CAPTION_FONT,
            )
            .x_label_area_size(40)
            .y_label_area_size(120);
    }
    let mut chart =
        builder.build_cartesian_2d(0usize..x_max, (0usize..slots).into_segmented())?;

    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    };
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_y_mesh();
        if LABELS {
            mesh.y_labels(slots)
                .y_label_formatter(&label_for)
                .x_desc("Frequency")
                .y_desc("Keyword");
        }
        mesh.draw()?;
    }
    if !LABELS {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (0usize, SegmentValue::Last),
                (0, SegmentValue::Exact(0)),
                (x_max, SegmentValue::Exact(0)),
            ],
            BLACK,
        )))?;
    }

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(BAR_COLOR.filled())
            .margin(4)
            .data(keywords.iter().enumerate().map(|(i, (_, count))| (i, *count))),
    )?;

    root.present()?;
    Ok(())
}
