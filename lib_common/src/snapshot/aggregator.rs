//! # Snapshot Aggregator
//!
//! Turns one aligned fetch into one display row per manifest entry.
//!
//! ## Workflow:
//! 1.  Collect every primary and fallback symbol and fetch them in a single
//!     call, so all 1-day and 1-week references come from the same table.
//! 2.  For each instrument, resolve the first symbol present in the table,
//!     convert its current, prior and week-back prices into display units,
//!     and compute both changes.
//! 3.  Fill synthetic spread rows last, from the already computed levels.
//!
//! The aggregator never fails. Missing data turns individual fields into
//! [`Reading::Unavailable`]; an empty table turns every field unavailable
//! while keeping the full row list.

use super::manifest::{
    manifest_symbols, CurveSpreadDef, InstrumentDef, LevelUnit, ManifestEntry, Quote,
};
use super::numeric::{change_between, Reading};
use super::sentiment::{sentiment_marker, Sentiment};
use super::series::{AlignedTable, LookbackWindow, SeriesSource};
use log::{debug, warn};

/// # Snapshot Row
///
/// One line of the snapshot table.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    /// The manifest's display name, regardless of which symbol resolved.
    pub label: String,
    /// Percentage change against the prior session.
    pub change_1d: Reading,
    /// Percentage change against the table's week-back session.
    pub change_1w: Reading,
    /// Current value in display units.
    pub level: Reading,
    /// How `level` is rendered.
    pub unit: LevelUnit,
    /// The manifest's category note.
    pub note: String,
}

impl SnapshotRow {
    fn unavailable(entry: &ManifestEntry) -> Self {
        Self {
            label: entry.display_name().to_string(),
            change_1d: Reading::Unavailable,
            change_1w: Reading::Unavailable,
            level: Reading::Unavailable,
            unit: entry.unit(),
            note: entry.category_note().to_string(),
        }
    }

    /// The formatted level, e.g. `5123.45`, `4.50%`, `40 bps` or `N/A`.
    pub fn level_text(&self) -> String {
        self.unit.render(self.level)
    }

    /// Marker for the 1-day change.
    pub fn sentiment_1d(&self) -> Sentiment {
        sentiment_marker(self.change_1d)
    }

    /// Marker for the 1-week change.
    pub fn sentiment_1w(&self) -> Sentiment {
        sentiment_marker(self.change_1w)
    }

    /// `[label, change_1d, change_1w, level, note]` as display strings.
    pub fn cells(&self) -> [String; 5] {
        [
            self.label.clone(),
            self.change_1d.to_string(),
            self.change_1w.to_string(),
            self.level_text(),
            self.note.clone(),
        ]
    }
}

/// Fetches `manifest`'s symbols once through `source` and builds the rows.
pub async fn build_snapshot<S: SeriesSource>(
    manifest: &[ManifestEntry],
    source: &S,
    window: &LookbackWindow,
) -> Vec<SnapshotRow> {
    let symbols = manifest_symbols(manifest);
    debug!("Requesting {} symbols over {} sessions", symbols.len(), window.sessions);
    let table = source.fetch_aligned(&symbols, window).await;
    snapshot_from_table(manifest, &table)
}

/// Builds one row per manifest entry from an already fetched table.
pub fn snapshot_from_table(manifest: &[ManifestEntry], table: &AlignedTable) -> Vec<SnapshotRow> {
    if table.is_empty() {
        warn!("Snapshot table is empty; every row is unavailable");
        return manifest.iter().map(SnapshotRow::unavailable).collect();
    }

    let mut rows: Vec<SnapshotRow> = manifest
        .iter()
        .map(|entry| match entry {
            ManifestEntry::Instrument(def) => instrument_row(entry, def, table),
            ManifestEntry::CurveSpread(_) => SnapshotRow::unavailable(entry),
        })
        .collect();

    // Spreads depend on finished instrument rows.
    for (idx, entry) in manifest.iter().enumerate() {
        if let ManifestEntry::CurveSpread(def) = entry {
            let level = spread_level(manifest, &rows, def);
            rows[idx].level = level;
        }
    }

    rows
}

/// `(long - short) * 100`, both legs in percentage-point yield units.
pub fn curve_spread_bps(long: Reading, short: Reading) -> Reading {
    match (long, short) {
        (Reading::Available(l), Reading::Available(s)) => Reading::from_f64((l - s) * 100.0),
        _ => Reading::Unavailable,
    }
}

fn resolve<'a>(def: &'a InstrumentDef, table: &AlignedTable) -> Option<&'a Quote> {
    def.candidates().find(|quote| table.contains(quote.symbol))
}

fn instrument_row(entry: &ManifestEntry, def: &InstrumentDef, table: &AlignedTable) -> SnapshotRow {
    let Some(quote) = resolve(def, table) else {
        debug!("No symbol available for {}", def.display_name);
        return SnapshotRow::unavailable(entry);
    };
    if quote.symbol != def.quote.symbol {
        debug!("{} resolved via fallback {}", def.display_name, quote.symbol);
    }

    let refs = table.reference_points(quote.symbol);
    let convert = |raw: Option<f64>| Reading::from(raw).map(|v| quote.transform.apply(v));
    let current = convert(refs.current);
    let prior = convert(refs.prior);
    let week_ago = convert(refs.week_ago);

    SnapshotRow {
        label: def.display_name.to_string(),
        change_1d: change_between(current, prior),
        change_1w: change_between(current, week_ago),
        level: current,
        unit: def.unit,
        note: def.category_note.to_string(),
    }
}

fn spread_level(manifest: &[ManifestEntry], rows: &[SnapshotRow], def: &CurveSpreadDef) -> Reading {
    let leg = |symbol: &str| {
        manifest
            .iter()
            .position(|e| matches!(e, ManifestEntry::Instrument(i) if i.quote.symbol == symbol))
            .map_or(Reading::Unavailable, |idx| rows[idx].level)
    };
    curve_spread_bps(leg(def.long_leg), leg(def.short_leg))
}
