//! # CNN Fear & Greed Index Data Model and Client
//!
//! This module defines the data structures and client logic for fetching and
//! normalizing the CNN Business Fear & Greed Index.
//!
//! ## Key Features:
//! - **Strict Data Modeling**: Uses `serde` to map the headline section of
//!   the JSON payload into typed structs. Sections the digest does not show
//!   are ignored.
//! - **Centralized Fetching**: Utilizes the `ApiCallCnn` client to handle the
//!   underlying HTTP requests and retry logic, keeping the concerns separated.
//! - **Data Normalization**: The `get_full_report` method fetches the raw data
//!   and deserializes it into `FearAndGreedData`, logging schema failures.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use crate::markets::cnn::apicallcnn::ApiCallCnn;
use crate::markets::error::MarketDataError;
use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::from_value;

/// # Fear and Greed Data
///
/// The part of the CNN Fear & Greed report the digest renders.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FearAndGreedData {
    /// The current Fear & Greed score and its associated rating.
    pub fear_and_greed: CurrentStats,
}

/// # Current Statistics
///
/// Represents the immediate, most recent values for the index.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentStats {
    /// The numerical score of the index (0-100).
    pub score: f64,
    /// The qualitative rating (e.g., "extreme greed", "fear").
    pub rating: String,
    /// The UTC timestamp of these statistics.
    pub timestamp: DateTime<Utc>,
    /// The score from the previous trading close.
    pub previous_close: f64,
    /// The score from one week prior.
    pub previous_1_week: f64,
    /// The score from one month prior.
    pub previous_1_month: f64,
    /// The score from one year prior.
    pub previous_1_year: f64,
}

impl CurrentStats {
    /// `"62 (greed)"`.
    pub fn headline(&self) -> String {
        format!("{:.0} ({})", self.score, self.rating)
    }
}

/// # Fear and Greed Client
///
/// A client for fetching and normalizing the CNN Fear & Greed Index report.
pub struct FearAndGreed {
    /// The HTTP client for the CNN API.
    api_call: ApiCallCnn,
}

impl FearAndGreed {
    /// Creates a new `FearAndGreed` client instance.
    pub fn new(api_call: ApiCallCnn) -> Self {
        Self { api_call }
    }

    /// Overrides the backoff unit of the underlying client.
    pub fn with_retry_delay(self, retry_delay: std::time::Duration) -> Self {
        Self {
            api_call: self.api_call.with_retry_delay(retry_delay),
        }
    }

    /// # Get Full Report
    ///
    /// Fetches the raw CNN Fear & Greed Index data and normalizes it into
    /// `FearAndGreedData`.
    ///
    /// ## Logic:
    /// 1.  Calls `api_call.fetch_cnn` to get the raw JSON payload, optionally
    ///     for a `date`.
    /// 2.  Deserializes the payload into `FearAndGreedData`.
    /// 3.  **On Error**: a deserialization failure means the API schema moved;
    ///     it is logged with the offending payload and returned as `Schema`.
    ///
    /// # Errors
    /// Any fetch error, or `Schema` on a payload mismatch.
    pub async fn get_full_report(&self, date: Option<&str>) -> Result<FearAndGreedData, MarketDataError> {
        let raw_json = self.api_call.fetch_cnn(date).await?;
        normalize(raw_json)
    }
}

/// Deserializes a raw graph payload.
fn normalize(raw_json: serde_json::Value) -> Result<FearAndGreedData, MarketDataError> {
    match from_value::<FearAndGreedData>(raw_json.clone()) {
        Ok(normalized) => {
            debug!("Fear and Greed data normalized successfully");
            Ok(normalized)
        }
        Err(e) => {
            error!("Normalization failed for Fear and Greed: {} (raw: {})", e, raw_json);
            Err(MarketDataError::Schema {
                path: "index/fearandgreed/graphdata".to_string(),
                source: e,
            })
        }
    }
}
