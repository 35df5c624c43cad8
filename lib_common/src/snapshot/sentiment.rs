//! # Qualitative Annotation
//!
//! Maps a percentage change onto a three-state marker. The band is fixed at
//! one percentage point either side of zero so routine daily noise stays
//! neutral.

use super::numeric::Reading;
use serde::Serialize;

/// Changes strictly above this many percentage points are bullish, strictly
/// below its negation bearish.
pub const SENTIMENT_THRESHOLD_PCT: f64 = 1.0;

/// # Sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    /// Change above `+SENTIMENT_THRESHOLD_PCT`.
    Bullish,
    /// Change below `-SENTIMENT_THRESHOLD_PCT`.
    Bearish,
    /// Anything else, including unavailable data.
    Neutral,
}

impl Sentiment {
    /// The marker glyph placed next to a change in the report.
    pub fn symbol(self) -> &'static str {
        match self {
            Sentiment::Bullish => "🟢",
            Sentiment::Bearish => "🔴",
            Sentiment::Neutral => "⚫",
        }
    }
}

/// Classifies a percentage change.
pub fn sentiment_marker(change: Reading) -> Sentiment {
    match change {
        Reading::Available(v) if v > SENTIMENT_THRESHOLD_PCT => Sentiment::Bullish,
        Reading::Available(v) if v < -SENTIMENT_THRESHOLD_PCT => Sentiment::Bearish,
        _ => Sentiment::Neutral,
    }
}
