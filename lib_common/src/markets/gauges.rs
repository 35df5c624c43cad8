//! # Scraped Sentiment Gauges
//!
//! Two public pages carry numbers the digest shows but expose no API: the
//! CBOE put/call ratio page and the AAII sentiment survey. Both are fetched
//! as text and mined with a regular expression. Markup changes silently turn
//! a gauge into `None`.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use reqwest::Method;
use serde::Serialize;

use crate::markets::error::MarketDataError;
use crate::retrieve::ky_http::{ApiClient, ClientOptions};

/// CBOE site root.
pub const CBOE_BASE: &str = "https://www.cboe.com/";
/// Put/call ratio page, relative to [`CBOE_BASE`].
pub const CBOE_PUT_CALL_PATH: &str = "data/put-call-ratios";
/// AAII site root.
pub const AAII_BASE: &str = "https://www.aaii.com/";
/// Sentiment survey page, relative to [`AAII_BASE`].
pub const AAII_SURVEY_PATH: &str = "sentimentsurvey";

static INDEX_PCR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Index Put/Call Ratio.*?(\d\.\d{2})").expect("valid gauge pattern"));
static TOTAL_PCR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Total Put/Call Ratio.*?(\d\.\d{2})").expect("valid gauge pattern"));
static VIX_PCR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)VIX Put/Call Ratio.*?(\d\.\d{2})").expect("valid gauge pattern"));
static AAII_BULLISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Bullish.*?(\d{1,2}\.?\d*)%").expect("valid gauge pattern"));

/// # Put/Call Ratios
///
/// The three CBOE ratios; `None` where the page had no match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PutCallRatios {
    /// Index options.
    pub index: Option<f64>,
    /// All exchange-listed options.
    pub total: Option<f64>,
    /// VIX options.
    pub vix: Option<f64>,
}

/// Extracts the put/call ratios from the CBOE page.
pub fn extract_put_call_ratios(html: &str) -> PutCallRatios {
    PutCallRatios {
        index: first_number(&INDEX_PCR, html),
        total: first_number(&TOTAL_PCR, html),
        vix: first_number(&VIX_PCR, html),
    }
}

/// Extracts the bullish percentage from the AAII survey page.
pub fn extract_aaii_bullish(html: &str) -> Option<f64> {
    first_number(&AAII_BULLISH, html)
}

/// First capture group of `pattern` in `haystack`, parsed as a number.
fn first_number(pattern: &Regex, haystack: &str) -> Option<f64> {
    pattern.captures(haystack)?.get(1)?.as_str().parse().ok()
}

/// # Page Scraper
///
/// Fetches one HTML page as text.
pub struct PageScraper {
    client: ApiClient,
    path: String,
}

impl PageScraper {
    /// A scraper for `base_url` + `path`.
    ///
    /// # Errors
    /// Fails if `base_url` is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, path: &str, options: ClientOptions) -> anyhow::Result<Self> {
        Ok(Self {
            client: ApiClient::with_options(base_url, options)?,
            path: path.to_string(),
        })
    }

    /// The page body.
    ///
    /// # Errors
    /// `Transport`, `Http` on a non-2xx status, or `EmptyBody`.
    pub async fn fetch_page(&self) -> Result<String, MarketDataError> {
        let response = self.client.request_text(Method::GET, &self.path, None).await?;

        if !response.success {
            return Err(MarketDataError::Http {
                status: response.status,
                path: self.path.clone(),
            });
        }

        let body = response
            .data
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| MarketDataError::EmptyBody(self.path.clone()))?;

        debug!("Fetched {} ({} bytes)", self.path, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::mock_http::{route_server, Route};

    const CBOE_PAGE: &str = r#"
        <table>
          <tr><td>Total Put/Call Ratio</td>
              <td>0.87</td></tr>
          <tr><td>Index Put/Call Ratio</td>
              <td class="v">1.12</td></tr>
          <tr><td>Equity Put/Call Ratio</td><td>0.61</td></tr>
        </table>"#;

    #[test]
    fn test_patterns_compile() {
        for pattern in [&INDEX_PCR, &TOTAL_PCR, &VIX_PCR, &AAII_BULLISH] {
            assert_eq!(pattern.captures_len(), 2);
        }
    }

    #[test]
    fn test_put_call_ratios_span_lines() {
        let ratios = extract_put_call_ratios(CBOE_PAGE);
        assert_eq!(ratios.total, Some(0.87));
        assert_eq!(ratios.index, Some(1.12));
        assert_eq!(ratios.vix, None);
    }

    #[test]
    fn test_put_call_ratio_requires_two_decimals() {
        let ratios = extract_put_call_ratios("VIX Put/Call Ratio: 1.2 then 0.45");
        assert_eq!(ratios.vix, Some(0.45));
    }

    #[test]
    fn test_aaii_bullish() {
        let page = "<div>Bullish</div>\n<span>38.5%</span><div>Neutral</div><span>30.1%</span>";
        assert_eq!(extract_aaii_bullish(page), Some(38.5));
        assert_eq!(extract_aaii_bullish("Bullish: 41%"), Some(41.0));
        assert_eq!(extract_aaii_bullish("no survey today"), None);
    }

    #[tokio::test]
    async fn test_fetch_page_and_status_error() {
        let base = route_server(vec![
            Route::new("data/put-call-ratios", 200, CBOE_PAGE),
            Route::new("blank", 200, "  "),
        ]);
        let options = ClientOptions { max_retries: 0, ..ClientOptions::default() };

        let page = PageScraper::new(&base, CBOE_PUT_CALL_PATH, options.clone()).unwrap();
        assert!(page.fetch_page().await.unwrap().contains("Total Put/Call Ratio"));

        let blank = PageScraper::new(&base, "blank", options.clone()).unwrap();
        assert!(matches!(blank.fetch_page().await, Err(MarketDataError::EmptyBody(_))));

        let missing = PageScraper::new(&base, "sentimentsurvey", options).unwrap();
        assert!(matches!(missing.fetch_page().await, Err(MarketDataError::Http { status: 404, .. })));
    }
}
