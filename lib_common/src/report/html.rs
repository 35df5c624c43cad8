//! # HTML Digest Rendering
//!
//! Cell formatting plus the `digest.html` template: no I/O, no clock. The
//! caller supplies the timestamp so output is reproducible in tests.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::markets::board::SentimentBoard;
use crate::report::writer::ReportError;
use crate::snapshot::aggregator::SnapshotRow;
use crate::snapshot::numeric::{Reading, UNAVAILABLE};

/// Column headers of the snapshot table.
pub const SNAPSHOT_HEADER: [&str; 5] = ["Index / Asset", "% Change (1D)", "% Change (1W)", "Level", "Note"];
/// Column headers of the sentiment table.
pub const SENTIMENT_HEADER: [&str; 3] = ["Metric", "Value", "Comment"];
/// Data providers credited at the bottom of the report.
pub const SOURCES: [&str; 4] = ["Yahoo Finance", "CBOE (PCR)", "CNN Fear & Greed", "AAII"];

const SNAPSHOT_COMMENTARY: &str = "10Y down supports growth; gold at highs signals defense; \
    DXY up weighs on commodities and exporters; VIX up means fear.";

/// # Digest Report
///
/// Everything one rendered page shows.
#[derive(Debug, Clone)]
pub struct DigestReport<'a> {
    /// Shown in the header as `As of YYYY-MM-DD HH:MM UTC`.
    pub generated_at: DateTime<Utc>,
    /// Snapshot rows in manifest order.
    pub snapshot: &'a [SnapshotRow],
    /// `None` when sentiment collection was skipped.
    pub sentiment: Option<&'a SentimentBoard>,
}

/// One `<tr>` of either table; cells are escaped when rendered.
#[derive(Debug, Clone, PartialEq)]
struct TableRow {
    cells: Vec<String>,
}

impl<const N: usize> From<[String; N]> for TableRow {
    fn from(cells: [String; N]) -> Self {
        Self { cells: cells.into() }
    }
}

#[derive(Template)]
#[template(path = "digest.html")]
struct DigestPage {
    as_of: String,
    unavailable: &'static str,
    snapshot_header: [&'static str; 5],
    snapshot_rows: Vec<TableRow>,
    commentary: &'static str,
    has_sentiment: bool,
    sentiment_header: [&'static str; 3],
    sentiment_rows: Vec<TableRow>,
    sources: [&'static str; 4],
}

/// Snapshot rows as display cells, each change followed by its marker.
pub fn snapshot_cells(row: &SnapshotRow) -> [String; 5] {
    let [label, d1, w1, level, note] = row.cells();
    [
        label,
        format!("{} {}", d1, row.sentiment_1d().symbol()),
        format!("{} {}", w1, row.sentiment_1w().symbol()),
        level,
        note,
    ]
}

/// Sentiment board as `[metric, value, comment]` rows.
pub fn sentiment_cells(board: &SentimentBoard) -> Vec<[String; 3]> {
    let ratio = |v: Option<f64>| Reading::from(v).format(2, "");
    let fear_greed = board
        .fear_greed
        .as_ref()
        .map(|fg| fg.headline())
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    let fear_greed_comment = match &board.fear_greed {
        Some(fg) => format!("Extremes are often contrarian; 1W ago {:.0}", fg.previous_1_week),
        None => "Extremes are often contrarian".to_string(),
    };

    vec![
        [
            "Put/Call Ratio (Index)".to_string(),
            ratio(board.put_call.index),
            "PCR above 1 means hedging".to_string(),
        ],
        [
            "Put/Call Ratio (Total)".to_string(),
            ratio(board.put_call.total),
            "High PCR is risk-off".to_string(),
        ],
        [
            "Put/Call Ratio (VIX)".to_string(),
            ratio(board.put_call.vix),
            "Skew of volatility expectations".to_string(),
        ],
        ["Fear & Greed".to_string(), fear_greed, fear_greed_comment],
        [
            "AAII Sentiment (Bullish)".to_string(),
            Reading::from(board.aaii_bullish).format(1, "%"),
            "Retail sentiment".to_string(),
        ],
    ]
}

/// # Render Digest
///
/// The complete page, from `templates/digest.html`.
///
/// ## Sections:
/// 1. Header with the generation time.
/// 2. Market snapshot table and a one-line commentary.
/// 3. Options & sentiment table.
/// 4. Sources list.
///
/// An empty snapshot or a missing board renders as `<p>N/A</p>`. Every
/// table cell is HTML-escaped.
///
/// # Errors
/// `Render` if the template engine fails.
pub fn render_digest(report: &DigestReport<'_>) -> Result<String, ReportError> {
    let page = DigestPage {
        as_of: report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        unavailable: UNAVAILABLE,
        snapshot_header: SNAPSHOT_HEADER,
        snapshot_rows: report.snapshot.iter().map(|r| snapshot_cells(r).into()).collect(),
        commentary: SNAPSHOT_COMMENTARY,
        has_sentiment: report.sentiment.is_some(),
        sentiment_header: SENTIMENT_HEADER,
        sentiment_rows: report
            .sentiment
            .map(|board| sentiment_cells(board).into_iter().map(TableRow::from).collect())
            .unwrap_or_default(),
        sources: SOURCES,
    };

    Ok(page.render()?)
}
