use anyhow::Result;
use chrono::{DateTime, Utc};
use lib_common::markets::{ChartSettings, SentimentBoard, SentimentDesk, YahooChartSource};
use lib_common::report::{render_digest, write_report, DigestReport, ReportError};
use lib_common::retrieve::ky_http::ClientOptions;
use lib_common::snapshot::{
    build_snapshot, AlignedTable, LookbackWindow, SeriesSource, SnapshotRow, US_MARKET_MANIFEST,
};
use std::path::PathBuf;
use std::time::Instant;

use super::config::Settings;

/// Snapshot and sentiment for one run.
pub struct Collected {
    pub snapshot: Vec<SnapshotRow>,
    pub sentiment: Option<SentimentBoard>,
}

/// Fetches the snapshot and, when a desk is given, the sentiment board at the
/// same time.
pub async fn collect<S: SeriesSource>(
    source: &S,
    desk: Option<&SentimentDesk>,
    window: &LookbackWindow,
) -> Collected {
    let sentiment = async {
        match desk {
            Some(d) => Some(d.fetch_board().await),
            None => None,
        }
    };

    let (snapshot, sentiment) = tokio::join!(build_snapshot(US_MARKET_MANIFEST, source, window), sentiment);

    let available = snapshot.iter().filter(|r| r.level.is_available()).count();
    log::info!("Snapshot: {}/{} rows with a level", available, snapshot.len());

    Collected { snapshot, sentiment }
}

/// Renders the collected data as of `generated_at`.
pub fn render(collected: &Collected, generated_at: DateTime<Utc>) -> Result<String, ReportError> {
    render_digest(&DigestReport {
        generated_at,
        snapshot: &collected.snapshot,
        sentiment: collected.sentiment.as_ref(),
    })
}

/// Stands in for the price client when it cannot be built.
struct NoPrices;

impl SeriesSource for NoPrices {
    async fn fetch_aligned(&self, _symbols: &[String], _window: &LookbackWindow) -> AlignedTable {
        AlignedTable::new()
    }
}

/// Collects from whatever clients exist, renders and writes the page.
/// Without a price source every snapshot row is unavailable.
async fn publish<S: SeriesSource>(
    source: Option<&S>,
    desk: Option<&SentimentDesk>,
    settings: &Settings,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf> {
    let window = LookbackWindow::daily(settings.lookback_sessions);
    let collected = match source {
        Some(source) => collect(source, desk, &window).await,
        None => collect(&NoPrices, desk, &window).await,
    };

    let html = render(&collected, generated_at)?;
    Ok(write_report(&settings.output, &html)?)
}

/// One full run: fetch, render, write. A client that cannot be built is
/// logged and its section rendered unavailable; only a report that cannot
/// be rendered or written fails the run.
pub async fn run(settings: &Settings) -> Result<PathBuf> {
    let started = Instant::now();

    let options = ClientOptions {
        timeout: settings.http_timeout,
        user_agent: settings.user_agent.clone(),
        ..ClientOptions::default()
    };

    let source = YahooChartSource::new(
        options.clone(),
        ChartSettings {
            deadline: settings.fetch_deadline,
            max_concurrency: settings.max_concurrency,
        },
    )
    .inspect_err(|e| log::error!("Price client unavailable, snapshot left empty: {:#}", e))
    .ok();

    let desk = if settings.skip_sentiment {
        log::info!("Sentiment gauges skipped by configuration");
        None
    } else {
        SentimentDesk::new(options)
            .inspect_err(|e| log::error!("Sentiment clients unavailable, section left empty: {:#}", e))
            .ok()
    };

    let path = publish(source.as_ref(), desk.as_ref(), settings, Utc::now()).await?;

    log::info!("Digest generated in {:.1}s", started.elapsed().as_secs_f64());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest_logic::config::Config;
    use chrono::{NaiveDate, TimeZone};
    use tempfile::tempdir;

    struct FixedSource(AlignedTable);

    impl SeriesSource for FixedSource {
        async fn fetch_aligned(&self, _symbols: &[String], _window: &LookbackWindow) -> AlignedTable {
            self.0.clone()
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_collect_and_render_without_sentiment() {
        let mut table = AlignedTable::new();
        table.insert_series("^GSPC", [(day(4), 100.0), (day(5), 101.0), (day(6), 99.0), (day(7), 105.0)]);
        table.insert_series("DX-Y.NYB", [(day(4), 98.0), (day(5), 100.0), (day(6), 102.0)]);

        let collected = collect(&FixedSource(table), None, &LookbackWindow::default()).await;
        assert_eq!(collected.snapshot.len(), US_MARKET_MANIFEST.len());
        assert!(collected.sentiment.is_none());

        let html = render(&collected, Utc.with_ymd_and_hms(2024, 3, 7, 22, 0, 0).unwrap()).unwrap();
        assert!(html.contains("As of 2024-03-07 22:00 UTC"));
        assert!(html.contains("<td>6.06% 🟢</td><td>N/A ⚫</td><td>105.00</td>"));
        assert!(html.contains("<td>102.00</td>"));
        assert!(html.contains("<p>N/A</p>"));
    }

    #[tokio::test]
    async fn test_empty_fetch_still_renders_every_row() {
        let collected = collect(&FixedSource(AlignedTable::new()), None, &LookbackWindow::default()).await;
        assert!(collected.snapshot.iter().all(|r| !r.level.is_available()));

        let html = render(&collected, Utc.with_ymd_and_hms(2024, 3, 7, 22, 0, 0).unwrap()).unwrap();
        assert_eq!(html.matches("<tr>").count(), US_MARKET_MANIFEST.len() + 1);
    }

    fn settings_writing_to(output: PathBuf) -> Settings {
        Config {
            output: Some(output),
            ..Default::default()
        }
        .resolve()
    }

    #[tokio::test]
    async fn test_missing_clients_still_write_the_report() {
        let dir = tempdir().unwrap();
        let settings = settings_writing_to(dir.path().join("site").join("index.html"));
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 22, 0, 0).unwrap();

        let path = publish(None::<&FixedSource>, None, &settings, at).await.unwrap();

        assert_eq!(path, settings.output);
        let html = std::fs::read_to_string(&path).unwrap();
        assert_eq!(html.matches("<tr>").count(), US_MARKET_MANIFEST.len() + 1);
        assert!(html.contains("<p>N/A</p>"));
    }

    #[tokio::test]
    async fn test_unwritable_output_fails_the_run() {
        let dir = tempdir().unwrap();
        let settings = settings_writing_to(dir.path().to_path_buf());
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 22, 0, 0).unwrap();

        let err = publish(None::<&FixedSource>, None, &settings, at).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<ReportError>(), Some(ReportError::Write { .. })));
    }
}
