//! # Sentiment Board
//!
//! Collects the options and survey gauges shown next to the market snapshot.
//! Every gauge is best effort: a failed source is logged and its value stays
//! `None`, the board itself is always produced.

use log::{info, warn};
use serde::Serialize;
use std::time::Duration;

use crate::markets::cnn::apicallcnn::{ApiCallCnn, CNN_DATAVIZ_BASE};
use crate::markets::cnn::fearandgreed::{CurrentStats, FearAndGreed};
use crate::markets::gauges::{
    extract_aaii_bullish, extract_put_call_ratios, PageScraper, PutCallRatios, AAII_BASE, AAII_SURVEY_PATH,
    CBOE_BASE, CBOE_PUT_CALL_PATH,
};
use crate::retrieve::ky_http::ClientOptions;

/// # Sentiment Board
///
/// One reading per gauge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentBoard {
    /// CBOE put/call ratios.
    pub put_call: PutCallRatios,
    /// CNN Fear & Greed headline.
    pub fear_greed: Option<CurrentStats>,
    /// AAII bullish share, in percent.
    pub aaii_bullish: Option<f64>,
}

impl SentimentBoard {
    /// `true` when not a single gauge could be read.
    pub fn is_empty(&self) -> bool {
        self.put_call == PutCallRatios::default() && self.fear_greed.is_none() && self.aaii_bullish.is_none()
    }
}

/// # Sentiment Endpoints
///
/// Where each gauge is fetched from.
#[derive(Debug, Clone)]
pub struct SentimentEndpoints {
    /// CBOE site root.
    pub cboe_base: String,
    /// AAII site root.
    pub aaii_base: String,
    /// CNN dataviz API root.
    pub cnn_base: String,
}

impl Default for SentimentEndpoints {
    fn default() -> Self {
        Self {
            cboe_base: CBOE_BASE.to_string(),
            aaii_base: AAII_BASE.to_string(),
            cnn_base: CNN_DATAVIZ_BASE.to_string(),
        }
    }
}

impl SentimentEndpoints {
    /// Every gauge under one root, for local fixtures.
    pub fn single_host(base: &str) -> Self {
        Self {
            cboe_base: base.to_string(),
            aaii_base: base.to_string(),
            cnn_base: base.to_string(),
        }
    }
}

/// # Sentiment Desk
///
/// Owns one client per gauge and fills a [`SentimentBoard`].
pub struct SentimentDesk {
    cboe: PageScraper,
    aaii: PageScraper,
    fear_greed: FearAndGreed,
}

impl SentimentDesk {
    /// A desk against the production sources.
    ///
    /// # Errors
    /// Fails if an HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> anyhow::Result<Self> {
        Self::with_endpoints(&SentimentEndpoints::default(), options)
    }

    /// A desk against explicit endpoints.
    ///
    /// # Errors
    /// Fails if an endpoint URL is invalid or an HTTP client cannot be built.
    pub fn with_endpoints(endpoints: &SentimentEndpoints, options: ClientOptions) -> anyhow::Result<Self> {
        Ok(Self {
            cboe: PageScraper::new(&endpoints.cboe_base, CBOE_PUT_CALL_PATH, options.clone())?,
            aaii: PageScraper::new(&endpoints.aaii_base, AAII_SURVEY_PATH, options.clone())?,
            fear_greed: FearAndGreed::new(ApiCallCnn::with_base_url(&endpoints.cnn_base, options)?),
        })
    }

    /// Shortens the CNN retry backoff.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.fear_greed = self.fear_greed.with_retry_delay(retry_delay);
        self
    }

    /// # Fetch Board
    ///
    /// Queries all gauges concurrently. Never fails.
    pub async fn fetch_board(&self) -> SentimentBoard {
        let (cboe, aaii, cnn) = tokio::join!(
            self.cboe.fetch_page(),
            self.aaii.fetch_page(),
            self.fear_greed.get_full_report(None)
        );

        let put_call = match cboe {
            Ok(page) => extract_put_call_ratios(&page),
            Err(e) => {
                warn!("CBOE put/call ratios unavailable: {}", e);
                PutCallRatios::default()
            }
        };

        let aaii_bullish = match aaii {
            Ok(page) => extract_aaii_bullish(&page),
            Err(e) => {
                warn!("AAII survey unavailable: {}", e);
                None
            }
        };

        let fear_greed = match cnn {
            Ok(report) => Some(report.fear_and_greed),
            Err(e) => {
                warn!("CNN Fear & Greed unavailable: {}", e);
                None
            }
        };

        let board = SentimentBoard {
            put_call,
            fear_greed,
            aaii_bullish,
        };
        info!(
            "Sentiment board: put/call {:?}, fear & greed {}, AAII bullish {:?}",
            board.put_call,
            board.fear_greed.as_ref().map(CurrentStats::headline).unwrap_or_else(|| "N/A".into()),
            board.aaii_bullish
        );
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::mock_http::{route_server, Route};

    const FNG: &str = r#"{"fear_and_greed":{"score":25.0,"rating":"extreme fear",
        "timestamp":"2024-03-04T23:59:57+00:00","previous_close":27.0,
        "previous_1_week":30.0,"previous_1_month":40.0,"previous_1_year":55.0}}"#;

    fn desk(base: &str) -> SentimentDesk {
        SentimentDesk::with_endpoints(
            &SentimentEndpoints::single_host(base),
            ClientOptions { max_retries: 0, ..ClientOptions::default() },
        )
        .unwrap()
        .with_retry_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_board_reads_all_gauges() {
        let base = route_server(vec![
            Route::new("put-call-ratios", 200, "Index Put/Call Ratio 1.05 Total Put/Call Ratio 0.92 VIX Put/Call Ratio 0.40"),
            Route::new("sentimentsurvey", 200, "<b>Bullish</b> 44.2%"),
            Route::new("graphdata", 200, FNG),
        ]);

        let board = desk(&base).fetch_board().await;
        assert_eq!(board.put_call.index, Some(1.05));
        assert_eq!(board.put_call.total, Some(0.92));
        assert_eq!(board.put_call.vix, Some(0.40));
        assert_eq!(board.aaii_bullish, Some(44.2));
        assert_eq!(board.fear_greed.unwrap().headline(), "25 (extreme fear)");
    }

    #[tokio::test]
    async fn test_board_degrades_per_gauge() {
        let base = route_server(vec![Route::new("sentimentsurvey", 200, "Bullish 31.0%")]);

        let board = desk(&base).fetch_board().await;
        assert_eq!(board.put_call, PutCallRatios::default());
        assert!(board.fear_greed.is_none());
        assert_eq!(board.aaii_bullish, Some(31.0));
        assert!(!board.is_empty());
    }

    #[test]
    fn test_default_board_is_empty() {
        assert!(SentimentBoard::default().is_empty());
    }
}
