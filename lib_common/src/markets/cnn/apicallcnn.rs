//! # CNN API Client
//!
//! This module provides a dedicated and resilient client for interacting with the
//! CNN Fear & Greed Index API. It encapsulates the logic for making HTTP requests,
//! handling retries, and processing responses specifically for this data source.
//!
//! ## Core Features:
//! - **Dedicated Client**: Uses a pre-configured `ApiClient` with the base URL for
//!   the CNN API, simplifying request paths.
//! - **Browser Headers**: The dataviz endpoint rejects bare clients, so every
//!   request carries a browser-mimic header set.
//! - **Resilient Fetching**: The `fetch_cnn` method retries with a linear
//!   backoff on HTTP errors and empty bodies.
//! - **Date-based Queries**: Supports fetching the graph as of a given date.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use crate::markets::error::MarketDataError;
use crate::retrieve::ky_http::{ApiClient, ClientOptions};
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tokio::time::{sleep, Duration};

/// Production base URL of the CNN dataviz API.
pub const CNN_DATAVIZ_BASE: &str = "https://production.dataviz.cnn.io/";

const GRAPH_PATH: &str = "index/fearandgreed/graphdata";
const MAX_ATTEMPTS: u32 = 3;

/// # CNN API Call Client
///
/// A specialized client for making requests to the CNN Fear & Greed Index API.
pub struct ApiCallCnn {
    /// The underlying generic HTTP client, pre-configured for the CNN API base URL.
    client: ApiClient,
    /// Unit of the linear backoff between attempts.
    retry_delay: Duration,
}

impl ApiCallCnn {
    /// # New `ApiCallCnn`
    ///
    /// Initializes a client for the production CNN dataviz API.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> anyhow::Result<Self> {
        Self::with_base_url(CNN_DATAVIZ_BASE, options)
    }

    /// Initializes a client against an arbitrary base URL.
    ///
    /// # Errors
    /// Fails if `base_url` is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, options: ClientOptions) -> anyhow::Result<Self> {
        Ok(Self {
            client: ApiClient::with_options(base_url, options)?,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Overrides the backoff unit.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// # Fetch CNN Data
    ///
    /// Fetches the Fear & Greed graph payload with built-in retry logic.
    ///
    /// ## Logic:
    /// 1.  Builds the request path, appending `/{date}` for a dated query.
    /// 2.  Tries up to three times.
    /// 3.  **On Success (`2xx` with a non-null body)**: returns the payload.
    /// 4.  **On HTTP Error or empty body**: logs and retries after a linear
    ///     backoff (`retry_delay`, then twice that).
    /// 5.  Transport failures are returned immediately; the retry middleware
    ///     has already handled the transient ones.
    ///
    /// ## Arguments
    /// * `date` - Optional `YYYY-MM-DD`. `None` fetches the latest data.
    ///
    /// # Errors
    /// `Transport` on network failure, `Exhausted` when every attempt failed.
    pub async fn fetch_cnn(&self, date: Option<&str>) -> Result<Value, MarketDataError> {
        let mut attempts = 0;

        let mut path = String::from(GRAPH_PATH);
        if let Some(d) = date {
            path.push('/');
            path.push_str(d);
        }

        loop {
            attempts += 1;

            let response = self
                .client
                .request::<Value, ()>(Method::GET, &path, Some(cnn_headers()), None)
                .await?;

            if response.success {
                match response.data {
                    Some(body) if !body.is_null() => {
                        debug!("CNN payload received for {} (attempt {})", path, attempts);
                        return Ok(body);
                    }
                    _ => warn!("CNN API returned empty data (Attempt {}/{})", attempts, MAX_ATTEMPTS),
                }
            } else {
                warn!(
                    "HTTP Request failed for {}: Status {} (Attempt {}/{})",
                    path, response.status, attempts, MAX_ATTEMPTS
                );
            }

            if attempts >= MAX_ATTEMPTS {
                error!("Final failure: CNN API unreachable or invalid after {} attempts", MAX_ATTEMPTS);
                return Err(MarketDataError::Exhausted { path, attempts });
            }

            sleep(self.retry_delay * attempts).await;
        }
    }
}

/// Browser-mimic headers accepted by the dataviz endpoint.
fn cnn_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    let header_list = [
        ("accept", "application/json, text/plain, */*"),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "no-cache"),
        ("origin", "https://edition.cnn.com"),
        ("pragma", "no-cache"),
        ("referer", "https://edition.cnn.com/"),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "cross-site"),
        ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36"),
    ];

    for (name, value) in header_list {
        if let (Ok(h_name), Ok(h_value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            headers.insert(h_name, h_value);
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::mock_http::{route_server, Route};

    fn client(base: &str) -> ApiCallCnn {
        ApiCallCnn::with_base_url(base, ClientOptions { max_retries: 0, ..ClientOptions::default() })
            .unwrap()
            .with_retry_delay(Duration::from_millis(5))
    }

    #[test]
    fn test_headers_are_browser_like() {
        let headers = cnn_headers();
        assert_eq!(headers.len(), 10);
        assert!(headers["user-agent"].to_str().unwrap().starts_with("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_dated_payload() {
        let base = route_server(vec![Route::new("graphdata/2024-03-04", 200, r#"{"fear_and_greed":{"score":50}}"#)]);
        let body = client(&base).fetch_cnn(Some("2024-03-04")).await.unwrap();
        assert_eq!(body["fear_and_greed"]["score"], 50);
    }

    #[tokio::test]
    async fn test_gives_up_after_three_attempts() {
        let base = route_server(vec![Route::new("graphdata", 418, "I'm a teapot")]);
        let err = client(&base).fetch_cnn(None).await.unwrap_err();
        assert!(matches!(err, MarketDataError::Exhausted { attempts: 3, .. }));
    }
}
