//! # Financial Market APIs Module
//!
//! This module groups together all logic and client implementations related to
//! specific financial market data providers. Its purpose is to abstract the
//! details of interacting with external market services, providing normalized
//! data to the snapshot and report layers.
//!
//! ## Contained Modules:
//!
//! - **`yahoo`**: The Yahoo Finance chart client, which implements the
//!   snapshot's `SeriesSource` boundary.
//!
//! - **`cnn`**: Houses clients and data structures for the CNN Business
//!   Fear & Greed Index.
//!
//! - **`gauges`**: Text scrapers for the CBOE put/call ratios and the AAII
//!   sentiment survey.
//!
//! - **`board`**: The `SentimentDesk`, which queries every gauge concurrently
//!   and degrades per gauge.
//!
//! - **`error`**: `MarketDataError`, shared by all of the above.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Concurrent, best-effort sentiment collection.
pub mod board;
/// Client for interacting with CNN Business APIs, such as the Fear & Greed Index.
pub mod cnn;
/// Error type of the market clients.
pub mod error;
/// CBOE and AAII page scrapers.
pub mod gauges;
/// Client for the Yahoo Finance chart API.
pub mod yahoo;

#[cfg(test)]
pub(crate) mod mock_http;

pub use board::{SentimentBoard, SentimentDesk, SentimentEndpoints};
pub use error::MarketDataError;
pub use yahoo::{ChartSettings, YahooChartSource};
