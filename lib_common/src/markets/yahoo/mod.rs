//! # Yahoo Finance Integration Module
//!
//! Historical price retrieval from the public Yahoo Finance chart API. This is
//! the production implementation of the snapshot's `SeriesSource` boundary.
//!
//! ## Contained Modules:
//!
//! - **`chart`**: The `YahooChartSource` client, the chart payload model and
//!   the conversion of bars into session-dated closes.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Chart API client and payload model.
pub mod chart;

pub use chart::{ChartSettings, YahooChartSource, YAHOO_CHART_BASE};
