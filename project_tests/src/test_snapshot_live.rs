//! # Market Snapshot Live Data Test
//!
//! Fetches the full instrument basket from Yahoo Finance via lib_common and
//! prints the resulting rows.

use lib_common::markets::{ChartSettings, YahooChartSource};
use lib_common::retrieve::ky_http::ClientOptions;
use lib_common::snapshot::{build_snapshot, LookbackWindow, US_MARKET_MANIFEST};

/// Executes the live snapshot fetch.
///
/// // Statement: Exits non-zero when not a single level could be fetched.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let source = YahooChartSource::new(ClientOptions::default(), ChartSettings::default())?;

    println!("[*] Requesting {} manifest entries from Yahoo Finance...", US_MARKET_MANIFEST.len());

    let rows = build_snapshot(US_MARKET_MANIFEST, &source, &LookbackWindow::default()).await;

    println!("-----------------------------------------------");
    for row in &rows {
        let [label, d1, w1, level, note] = row.cells();
        println!(
            "{:<22} {:>9} {} {:>9} {} {:>12}  {}",
            label,
            d1,
            row.sentiment_1d().symbol(),
            w1,
            row.sentiment_1w().symbol(),
            level,
            note
        );
    }
    println!("-----------------------------------------------");

    let available = rows.iter().filter(|r| r.level.is_available()).count();
    println!("[INFO] {}/{} rows with a level", available, rows.len());

    if available == 0 {
        eprintln!("\n[ERROR] Snapshot came back empty");
        std::process::exit(1);
    }

    Ok(())
}
