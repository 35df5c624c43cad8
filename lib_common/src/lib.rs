// Declare the modules, each behind its feature
#[cfg(feature = "snapshot")]
pub mod snapshot;   // Aggregation core: numeric, sentiment, series, manifest, aggregator
#[cfg(feature = "retrieve")]
pub mod retrieve;   // Generic HTTP client
#[cfg(feature = "markets")]
pub mod markets;    // Yahoo chart, CNN, CBOE and AAII clients
#[cfg(feature = "report")]
pub mod report;     // HTML rendering and file output

// Re-export the entry points
#[cfg(feature = "snapshot")]
pub use snapshot::{build_snapshot, Reading, SnapshotRow, US_MARKET_MANIFEST};
#[cfg(feature = "markets")]
pub use markets::{SentimentBoard, SentimentDesk, YahooChartSource};
#[cfg(feature = "report")]
pub use report::{render_digest, write_report, DigestReport};
