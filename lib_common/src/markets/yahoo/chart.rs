//! # Yahoo Finance Chart Source
//!
//! Fetches daily closes from the public Yahoo Finance v8 chart endpoint and
//! assembles them into an [`AlignedTable`]. One request per symbol, run
//! concurrently with a bounded fan-out, all under a single overall deadline.
//!
//! ## Logic:
//! 1. Each symbol is requested as
//!    `v8/finance/chart/{symbol}?range={n}d&interval=1d`.
//! 2. Adjusted closes are preferred over raw closes when the payload carries
//!    both; `null` entries are skipped.
//! 3. Timestamps are mapped to session dates in the exchange's own time zone.
//! 4. A failed symbol is logged and left out of the table. If the deadline
//!    elapses the whole table comes back empty.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use futures_util::stream::{self, StreamExt};
use log::{debug, error, warn};
use reqwest::Method;
use serde::Deserialize;

use crate::markets::error::MarketDataError;
use crate::retrieve::ky_http::{ApiClient, ClientOptions};
use crate::snapshot::series::{AlignedTable, LookbackWindow, SeriesSource};

/// Production base URL of the chart API.
pub const YAHOO_CHART_BASE: &str = "https://query1.finance.yahoo.com/";

/// # Chart Settings
///
/// Fan-out and deadline for one `fetch_aligned` call.
#[derive(Debug, Clone, Copy)]
pub struct ChartSettings {
    /// Overall bound for the whole batch.
    pub deadline: Duration,
    /// Maximum requests in flight.
    pub max_concurrency: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(45),
            max_concurrency: 6,
        }
    }
}

/// Raw chart payload: `{"chart": {"result": [...], "error": ...}}`.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    /// The single top-level member.
    pub chart: ChartBody,
}

/// Results or an upstream error description.
#[derive(Debug, Deserialize)]
pub struct ChartBody {
    /// Present on success; one element per requested symbol.
    pub result: Option<Vec<ChartResult>>,
    /// Present when Yahoo rejects the symbol.
    pub error: Option<ChartError>,
}

/// Error member of a chart payload.
#[derive(Debug, Deserialize)]
pub struct ChartError {
    /// Short code, e.g. `Not Found`.
    pub code: String,
    /// Human readable explanation.
    pub description: String,
}

/// One symbol's series.
#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Exchange metadata.
    pub meta: ChartMeta,
    /// Epoch seconds, one per bar.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    /// Price arrays aligned with `timestamp`.
    pub indicators: ChartIndicators,
}

/// The subset of chart metadata needed to date the bars.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Symbol as echoed by Yahoo.
    pub symbol: Option<String>,
    /// IANA zone of the listing exchange, e.g. `America/New_York`.
    pub exchange_timezone_name: Option<String>,
    /// UTC offset of the exchange in seconds.
    pub gmtoffset: Option<i32>,
}

/// Price arrays of a chart result.
#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    /// OHLCV block; only the close is read.
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
    /// Split and dividend adjusted closes, when requested and available.
    #[serde(default)]
    pub adjclose: Vec<AdjCloseBlock>,
}

/// Raw closes.
#[derive(Debug, Deserialize)]
pub struct QuoteBlock {
    /// `null` where the exchange had no print.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Adjusted closes.
#[derive(Debug, Deserialize)]
pub struct AdjCloseBlock {
    /// `null` where the exchange had no print.
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// # Yahoo Chart Source
///
/// A [`SeriesSource`] backed by the Yahoo Finance chart API.
pub struct YahooChartSource {
    client: ApiClient,
    settings: ChartSettings,
}

impl YahooChartSource {
    /// Creates a source pointed at the production endpoint.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(options: ClientOptions, settings: ChartSettings) -> anyhow::Result<Self> {
        Self::with_base_url(YAHOO_CHART_BASE, options, settings)
    }

    /// Creates a source against an arbitrary base URL.
    ///
    /// # Errors
    /// Fails if `base_url` is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, options: ClientOptions, settings: ChartSettings) -> anyhow::Result<Self> {
        Ok(Self {
            client: ApiClient::with_options(base_url, options)?,
            settings,
        })
    }

    /// # Fetch Series
    ///
    /// Downloads and parses one symbol's chart.
    ///
    /// # Errors
    /// Any transport, HTTP, schema or upstream failure for this symbol.
    pub async fn fetch_series(
        &self,
        symbol: &str,
        window: &LookbackWindow,
    ) -> Result<Vec<(NaiveDate, f64)>, MarketDataError> {
        let path = chart_path(symbol, window);
        let response = self
            .client
            .request_text(Method::GET, &path, None)
            .await?;

        if !response.success {
            // Yahoo explains unknown symbols in a JSON error body.
            if let Some(body) = response.error_body.as_deref() {
                if let Ok(ChartEnvelope { chart: ChartBody { error: Some(e), .. } }) = serde_json::from_str(body) {
                    return Err(MarketDataError::Upstream {
                        symbol: symbol.to_string(),
                        description: format!("{}: {}", e.code, e.description),
                    });
                }
            }
            return Err(MarketDataError::Http {
                status: response.status,
                path,
            });
        }

        let body = response
            .data
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| MarketDataError::EmptyBody(path.clone()))?;

        let envelope: ChartEnvelope =
            serde_json::from_str(&body).map_err(|source| MarketDataError::Schema { path, source })?;

        parse_chart(symbol, envelope)
    }
}

impl SeriesSource for YahooChartSource {
    async fn fetch_aligned(&self, symbols: &[String], window: &LookbackWindow) -> AlignedTable {
        let fan_out = self.settings.max_concurrency.max(1);

        let batch = stream::iter(symbols.iter().cloned())
            .map(|symbol| async move {
                let outcome = self.fetch_series(&symbol, window).await;
                (symbol, outcome)
            })
            .buffer_unordered(fan_out)
            .collect::<Vec<_>>();

        let results = match tokio::time::timeout(self.settings.deadline, batch).await {
            Ok(results) => results,
            Err(_) => {
                error!(
                    "Chart fetch exceeded the {:?} deadline for {} symbols; returning an empty table",
                    self.settings.deadline,
                    symbols.len()
                );
                return AlignedTable::new();
            }
        };

        let mut table = AlignedTable::new();
        for (symbol, outcome) in results {
            match outcome {
                Ok(observations) if observations.is_empty() => {
                    warn!("Chart for {} returned no closes", symbol);
                }
                Ok(observations) => {
                    debug!("Chart for {}: {} sessions", symbol, observations.len());
                    table.insert_series(&symbol, observations);
                }
                Err(e) => warn!("Chart for {} omitted: {}", symbol, e),
            }
        }
        table
    }
}

/// Relative request path for one symbol.
fn chart_path(symbol: &str, window: &LookbackWindow) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect();
    format!(
        "v8/finance/chart/{}?range={}&interval={}",
        encoded,
        window.range_code(),
        window.interval.code()
    )
}

/// # Parse Chart
///
/// Turns a decoded payload into `(session_date, close)` pairs, oldest first.
///
/// # Errors
/// `Upstream` when the payload carries an error member or no result.
pub fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<Vec<(NaiveDate, f64)>, MarketDataError> {
    if let Some(e) = envelope.chart.error {
        return Err(MarketDataError::Upstream {
            symbol: symbol.to_string(),
            description: format!("{}: {}", e.code, e.description),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::Upstream {
            symbol: symbol.to_string(),
            description: "chart payload has no result".to_string(),
        })?;

    let zone = result
        .meta
        .exchange_timezone_name
        .as_deref()
        .and_then(|name| name.parse::<Tz>().ok());
    let gmtoffset = result.meta.gmtoffset;

    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|b| b.adjclose)
        .filter(|c| !c.is_empty())
        .or_else(|| result.indicators.quote.into_iter().next().map(|b| b.close))
        .unwrap_or_default();

    let observations = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let price = close.filter(|p| p.is_finite())?;
            Some((session_date(ts, zone, gmtoffset)?, price))
        })
        .collect();

    Ok(observations)
}

/// The calendar date of `ts` at the exchange.
fn session_date(ts: i64, zone: Option<Tz>, gmtoffset: Option<i32>) -> Option<NaiveDate> {
    let utc = DateTime::<Utc>::from_timestamp(ts, 0)?;
    if let Some(tz) = zone {
        return Some(utc.with_timezone(&tz).date_naive());
    }
    match gmtoffset.and_then(FixedOffset::east_opt) {
        Some(offset) => Some(utc.with_timezone(&offset).date_naive()),
        None => Some(utc.date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::mock_http::{route_server, stalled_server, Route};

    // 2024-03-04..2024-03-06, 14:30 UTC (09:30 New York).
    const CHART_OK: &str = r#"{"chart":{"result":[{
        "meta":{"symbol":"^GSPC","exchangeTimezoneName":"America/New_York","gmtoffset":-18000},
        "timestamp":[1709562600,1709649000,1709735400],
        "indicators":{"quote":[{"close":[5130.95,null,5104.76]}]}
    }],"error":null}}"#;

    const CHART_NOT_FOUND: &str =
        r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn source(base: &str, settings: ChartSettings) -> YahooChartSource {
        YahooChartSource::with_base_url(base, ClientOptions { max_retries: 0, ..ClientOptions::default() }, settings)
            .unwrap()
    }

    #[test]
    fn test_chart_path_encodes_symbol() {
        let window = LookbackWindow::daily(10);
        assert_eq!(chart_path("^GSPC", &window), "v8/finance/chart/%5EGSPC?range=10d&interval=1d");
        assert_eq!(chart_path("CL=F", &window), "v8/finance/chart/CL%3DF?range=10d&interval=1d");
        assert_eq!(chart_path("DX-Y.NYB", &window), "v8/finance/chart/DX-Y.NYB?range=10d&interval=1d");
    }

    #[test]
    fn test_parse_skips_null_closes() {
        let envelope: ChartEnvelope = serde_json::from_str(CHART_OK).unwrap();
        let series = parse_chart("^GSPC", envelope).unwrap();
        assert_eq!(series, vec![(d(2024, 3, 4), 5130.95), (d(2024, 3, 6), 5104.76)]);
    }

    #[test]
    fn test_parse_prefers_adjusted_close() {
        let payload = r#"{"chart":{"result":[{
            "meta":{"exchangeTimezoneName":"America/New_York"},
            "timestamp":[1709562600],
            "indicators":{"quote":[{"close":[10.0]}],"adjclose":[{"adjclose":[9.5]}]}
        }]}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(payload).unwrap();
        assert_eq!(parse_chart("X", envelope).unwrap(), vec![(d(2024, 3, 4), 9.5)]);
    }

    #[test]
    fn test_session_date_uses_exchange_zone() {
        // 2024-03-05 02:00 UTC is still 2024-03-04 in New York.
        let ts = 1709604000;
        let ny: Tz = "America/New_York".parse().unwrap();
        assert_eq!(session_date(ts, Some(ny), None), Some(d(2024, 3, 4)));
        assert_eq!(session_date(ts, None, Some(-18000)), Some(d(2024, 3, 4)));
        assert_eq!(session_date(ts, None, None), Some(d(2024, 3, 5)));
    }

    #[test]
    fn test_parse_upstream_error() {
        let envelope: ChartEnvelope = serde_json::from_str(CHART_NOT_FOUND).unwrap();
        let err = parse_chart("NOPE", envelope).unwrap_err();
        assert!(matches!(err, MarketDataError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_fetch_aligned_omits_failed_symbols() {
        let base = route_server(vec![
            Route::new("%5EGSPC", 200, CHART_OK),
            Route::new("NOPE", 404, CHART_NOT_FOUND),
        ]);
        let src = source(&base, ChartSettings::default());

        let symbols = vec!["^GSPC".to_string(), "NOPE".to_string()];
        let table = src.fetch_aligned(&symbols, &LookbackWindow::default()).await;

        assert!(table.contains("^GSPC"));
        assert!(!table.contains("NOPE"));
        assert_eq!(table.sessions().len(), 2);
        let refs = table.reference_points("^GSPC");
        assert_eq!(refs.current, Some(5104.76));
        assert_eq!(refs.prior, Some(5130.95));
    }

    #[tokio::test]
    async fn test_fetch_series_reports_upstream_description() {
        let base = route_server(vec![Route::new("NOPE", 404, CHART_NOT_FOUND)]);
        let src = source(&base, ChartSettings::default());

        let err = src.fetch_series("NOPE", &LookbackWindow::default()).await.unwrap_err();
        match err {
            MarketDataError::Upstream { symbol, description } => {
                assert_eq!(symbol, "NOPE");
                assert!(description.starts_with("Not Found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_deadline_yields_empty_table() {
        let base = stalled_server();
        let src = source(
            &base,
            ChartSettings {
                deadline: Duration::from_millis(200),
                max_concurrency: 2,
            },
        );

        let symbols = vec!["^GSPC".to_string(), "^VIX".to_string()];
        let table = src.fetch_aligned(&symbols, &LookbackWindow::default()).await;
        assert!(table.is_empty());
    }
}
