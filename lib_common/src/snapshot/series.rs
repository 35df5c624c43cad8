//! # Aligned Time Series
//!
//! The contract between the snapshot aggregator and whatever fetches prices.
//!
//! A [`SeriesSource`] receives the full symbol set and a [`LookbackWindow`]
//! and returns an [`AlignedTable`]: per-symbol price observations keyed by
//! session date. Sources never fail outward. Network errors, rate limits and
//! malformed payloads are absorbed inside the source, which then returns a
//! partial or empty table.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

/// Number of observations spanned by the week-back reference, counting the
/// most recent session as the first.
pub const WEEK_SESSIONS: usize = 5;

/// Default number of trailing sessions requested from a source.
pub const DEFAULT_LOOKBACK_SESSIONS: u32 = 10;

/// Sampling interval of the fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SamplingInterval {
    /// One observation per trading session.
    Daily,
}

impl SamplingInterval {
    /// The interval code understood by chart endpoints (`1d`).
    pub fn code(self) -> &'static str {
        match self {
            SamplingInterval::Daily => "1d",
        }
    }
}

/// # Lookback Window
///
/// How much history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookbackWindow {
    /// Trailing sessions to cover.
    pub sessions: u32,
    /// Spacing between observations.
    pub interval: SamplingInterval,
}

impl LookbackWindow {
    /// A daily window of `sessions` sessions.
    pub fn daily(sessions: u32) -> Self {
        Self {
            sessions,
            interval: SamplingInterval::Daily,
        }
    }

    /// The range code for chart endpoints, e.g. `10d`.
    pub fn range_code(&self) -> String {
        format!("{}d", self.sessions.max(1))
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self::daily(DEFAULT_LOOKBACK_SESSIONS)
    }
}

/// # Reference Points
///
/// The three raw prices a snapshot row is built from. `None` means the
/// symbol has no observation at that depth.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReferencePoints {
    /// Most recent observation.
    pub current: Option<f64>,
    /// The observation immediately before `current`.
    pub prior: Option<f64>,
    /// Price on the table's week-back session; `None` with fewer than five
    /// sessions or no print on that session.
    pub week_ago: Option<f64>,
}

/// # Aligned Table
///
/// Symbol-keyed columns of `(session_date, price)` observations, each column
/// ordered by date ascending. One observation per symbol per date: inserting
/// a second price for the same date replaces the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedTable {
    columns: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl AlignedTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a whole column at once.
    pub fn insert_series<I>(&mut self, symbol: &str, observations: I)
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let column = self.columns.entry(symbol.to_string()).or_default();
        column.extend(observations);
    }

    /// `true` when no symbol has a single finite observation.
    pub fn is_empty(&self) -> bool {
        !self.columns.values().any(has_finite)
    }

    /// `true` when `symbol` is a column with at least one finite price.
    pub fn contains(&self, symbol: &str) -> bool {
        self.columns.get(symbol).is_some_and(has_finite)
    }

    /// The shared session index: every date any symbol traded on, ascending.
    pub fn sessions(&self) -> Vec<NaiveDate> {
        let all: BTreeSet<NaiveDate> = self
            .columns
            .values()
            .flat_map(|c| c.keys().copied())
            .collect();
        all.into_iter().collect()
    }

    /// The session `WEEK_SESSIONS - 1` steps before the latest one on the
    /// shared index, or `None` with fewer than `WEEK_SESSIONS` sessions.
    pub fn week_back_session(&self) -> Option<NaiveDate> {
        let sessions = self.sessions();
        sessions
            .len()
            .checked_sub(WEEK_SESSIONS)
            .and_then(|idx| sessions.get(idx).copied())
    }

    /// Picks the current, prior and week-back prices of `symbol`.
    ///
    /// `current` and `prior` are the symbol's last two finite prices, so a
    /// gap in its own column is skipped. `week_ago` is the symbol's price on
    /// [`week_back_session`](Self::week_back_session), the same session for
    /// every symbol; a missing or non-finite cell there leaves it `None`.
    pub fn reference_points(&self, symbol: &str) -> ReferencePoints {
        let Some(column) = self.columns.get(symbol) else {
            return ReferencePoints::default();
        };

        let mut latest = column.values().rev().copied().filter(|p| p.is_finite());
        let current = latest.next();
        let prior = latest.next();

        let week_ago = self
            .week_back_session()
            .and_then(|session| column.get(&session).copied())
            .filter(|p| p.is_finite());

        ReferencePoints {
            current,
            prior,
            week_ago,
        }
    }
}

fn has_finite(column: &BTreeMap<NaiveDate, f64>) -> bool {
    column.values().any(|p| p.is_finite())
}

/// # Series Source
///
/// The fetch boundary. Implementations must resolve within bounded time and
/// omit symbols they cannot serve instead of failing the whole call.
pub trait SeriesSource {
    /// Fetches every symbol in `symbols` over `window` as one aligned table.
    fn fetch_aligned(
        &self,
        symbols: &[String],
        window: &LookbackWindow,
    ) -> impl Future<Output = AlignedTable> + Send;
}
