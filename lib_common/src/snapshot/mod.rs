//! # Market Snapshot Module
//!
//! The computational core of the digest: it turns a short window of daily
//! prices for a fixed basket of instruments into display-ready rows with
//! 1-day and 1-week changes, unit-normalized levels and a derived 2s10s
//! spread.
//!
//! ## Contained Modules:
//!
//! - **`numeric`**: Total percentage-change arithmetic and the `Reading`
//!   result type (value or explicit "unavailable").
//! - **`sentiment`**: Three-state bullish / bearish / neutral marker.
//! - **`series`**: The `AlignedTable` returned by a fetch, the lookback
//!   window, and the `SeriesSource` trait every fetcher implements.
//! - **`manifest`**: The static instrument basket with fallback symbols and
//!   unit transforms.
//! - **`aggregator`**: `build_snapshot`, which fetches once and assembles one
//!   row per manifest entry, degrading to "N/A" instead of failing.
//!
//! Nothing in here performs I/O; fetchers live in `markets`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Snapshot assembly from an aligned table.
pub mod aggregator;
/// The instrument basket.
pub mod manifest;
/// Percentage change and the `Reading` sentinel type.
pub mod numeric;
/// Bullish / bearish / neutral classification.
pub mod sentiment;
/// Aligned time-series table and the fetch boundary trait.
pub mod series;

pub use aggregator::{build_snapshot, curve_spread_bps, snapshot_from_table, SnapshotRow};
pub use manifest::{ManifestEntry, US_MARKET_MANIFEST};
pub use numeric::{percentage_change, Reading, UNAVAILABLE};
pub use sentiment::{sentiment_marker, Sentiment};
pub use series::{AlignedTable, LookbackWindow, SeriesSource};
