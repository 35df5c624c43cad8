//! # Sentiment Gauges Live Data Test
//!
//! Queries CBOE, CNN and AAII via lib_common and prints the board as JSON.

use lib_common::markets::SentimentDesk;
use lib_common::retrieve::ky_http::ClientOptions;

/// Executes the live sentiment fetch.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let desk = SentimentDesk::new(ClientOptions::default())?;

    println!("[*] Requesting sentiment gauges...");

    let board = desk.fetch_board().await;

    println!("\n[RESULT] Board received:");
    println!("-----------------------------------------------");
    println!("{}", serde_json::to_string_pretty(&board)?);
    println!("-----------------------------------------------");

    if board.is_empty() {
        eprintln!("\n[ERROR] No gauge could be read");
        std::process::exit(1);
    }

    Ok(())
}
