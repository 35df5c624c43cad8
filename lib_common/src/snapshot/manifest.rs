//! # Instrument Manifest
//!
//! The fixed basket the snapshot reports on. Each entry names a primary
//! quote, ordered fallback quotes tried when the primary is missing, the
//! label and note shown in the report, and the unit its level is shown in.
//!
//! The manifest is a `static` slice built at compile time and never mutated.

use super::numeric::Reading;

/// # Unit Transform
///
/// Converts a raw quote into the unit the report displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitTransform {
    /// Value is already in display units.
    Identity,
    /// Value is quoted `n` times too large.
    DivideBy(f64),
}

impl UnitTransform {
    /// Applies the conversion.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            UnitTransform::Identity => value,
            UnitTransform::DivideBy(n) => value / n,
        }
    }
}

/// How a level is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUnit {
    /// `5123.45`
    Plain,
    /// `4.50%`, for yields.
    Percent,
    /// `40 bps`, for spreads.
    BasisPoints,
}

impl LevelUnit {
    /// Formats `level`, or `N/A`.
    pub fn render(self, level: Reading) -> String {
        match self {
            LevelUnit::Plain => level.format(2, ""),
            LevelUnit::Percent => level.format(2, "%"),
            LevelUnit::BasisPoints => level.format(0, " bps"),
        }
    }
}

/// A ticker together with the conversion its raw prices need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Upstream ticker, e.g. `^GSPC`.
    pub symbol: &'static str,
    /// Conversion applied to every price of this ticker.
    pub transform: UnitTransform,
}

impl Quote {
    /// A quote already in display units.
    pub const fn plain(symbol: &'static str) -> Self {
        Self {
            symbol,
            transform: UnitTransform::Identity,
        }
    }

    /// A quote that needs `transform`.
    pub const fn scaled(symbol: &'static str, transform: UnitTransform) -> Self {
        Self { symbol, transform }
    }
}

/// # Instrument Definition
///
/// One fetched instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentDef {
    /// Preferred quote.
    pub quote: Quote,
    /// Tried in order when `quote` is absent; the first present wins.
    pub fallbacks: &'static [Quote],
    /// Row label. Used even when a fallback resolved.
    pub display_name: &'static str,
    /// Free-text note shown in the last column.
    pub category_note: &'static str,
    /// Display unit of the level.
    pub unit: LevelUnit,
}

impl InstrumentDef {
    /// Primary quote followed by the fallbacks, in resolution order.
    pub fn candidates(&self) -> impl Iterator<Item = &Quote> {
        std::iter::once(&self.quote).chain(self.fallbacks.iter())
    }
}

/// # Curve Spread Definition
///
/// A synthetic row derived from two instrument rows, in basis points:
/// `(long - short) * 100`. Legs are referenced by their primary symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSpreadDef {
    /// Row label.
    pub display_name: &'static str,
    /// Free-text note.
    pub category_note: &'static str,
    /// Primary symbol of the long-maturity leg (e.g. 10-year).
    pub long_leg: &'static str,
    /// Primary symbol of the short-maturity leg (e.g. 2-year).
    pub short_leg: &'static str,
}

/// One line of the manifest, and therefore one row of the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestEntry {
    /// A fetched instrument.
    Instrument(InstrumentDef),
    /// A spread computed from two instrument rows.
    CurveSpread(CurveSpreadDef),
}

impl ManifestEntry {
    /// Row label.
    pub fn display_name(&self) -> &'static str {
        match self {
            ManifestEntry::Instrument(def) => def.display_name,
            ManifestEntry::CurveSpread(def) => def.display_name,
        }
    }

    /// Row note.
    pub fn category_note(&self) -> &'static str {
        match self {
            ManifestEntry::Instrument(def) => def.category_note,
            ManifestEntry::CurveSpread(def) => def.category_note,
        }
    }

    /// Display unit of the level.
    pub fn unit(&self) -> LevelUnit {
        match self {
            ManifestEntry::Instrument(def) => def.unit,
            ManifestEntry::CurveSpread(_) => LevelUnit::BasisPoints,
        }
    }
}

/// Every primary and fallback symbol in `manifest`, deduplicated, in
/// manifest order.
pub fn manifest_symbols(manifest: &[ManifestEntry]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for entry in manifest {
        if let ManifestEntry::Instrument(def) = entry {
            for quote in def.candidates() {
                if !symbols.iter().any(|s| s == quote.symbol) {
                    symbols.push(quote.symbol.to_string());
                }
            }
        }
    }
    symbols
}

const fn listed(symbol: &'static str, display_name: &'static str, category_note: &'static str) -> ManifestEntry {
    ManifestEntry::Instrument(InstrumentDef {
        quote: Quote::plain(symbol),
        fallbacks: &[],
        display_name,
        category_note,
        unit: LevelUnit::Plain,
    })
}

/// `^TNX` prints the 10-year yield times ten.
const TEN_YEAR: Quote = Quote::scaled("^TNX", UnitTransform::DivideBy(10.0));

const TWO_YEAR: Quote = Quote::plain("US2Y");

/// Two-year proxies. `^IRX` is the 13-week bill and the /100 is a
/// heuristic scaling, not a verified conversion to the two-year yield.
const TWO_YEAR_FALLBACKS: &[Quote] = &[
    Quote::plain("^UST2Y"),
    Quote::scaled("^IRX", UnitTransform::DivideBy(100.0)),
];

const DOLLAR_FALLBACKS: &[Quote] = &[Quote::plain("DX=F")];

/// The U.S. market snapshot basket.
pub static US_MARKET_MANIFEST: &[ManifestEntry] = &[
    listed("^GSPC", "SPX (^GSPC)", "U.S. large-cap benchmark"),
    listed("^NDX", "NDX (^NDX)", "Tech-heavy index"),
    listed("^DJI", "DJI (^DJI)", "Blue chips"),
    listed("^RUT", "RUT (^RUT)", "Small caps"),
    ManifestEntry::Instrument(InstrumentDef {
        quote: TWO_YEAR,
        fallbacks: TWO_YEAR_FALLBACKS,
        display_name: "US 2Y",
        category_note: "2-year yield (approx)",
        unit: LevelUnit::Percent,
    }),
    ManifestEntry::Instrument(InstrumentDef {
        quote: TEN_YEAR,
        fallbacks: &[],
        display_name: "US 10Y (^TNX)",
        category_note: "10-year yield (÷10 if bps)",
        unit: LevelUnit::Percent,
    }),
    ManifestEntry::CurveSpread(CurveSpreadDef {
        display_name: "2s10s Spread",
        category_note: "10Y − 2Y (bps)",
        long_leg: "^TNX",
        short_leg: "US2Y",
    }),
    listed("^VIX", "VIX (^VIX)", "Volatility index"),
    listed("CL=F", "WTI (CL=F)", "WTI crude"),
    listed("BZ=F", "Brent (BZ=F)", "Brent crude"),
    listed("NG=F", "NatGas (NG=F)", "Henry Hub gas"),
    listed("GC=F", "Gold (GC=F)", "Gold futures"),
    listed("SI=F", "Silver (SI=F)", "Silver futures"),
    ManifestEntry::Instrument(InstrumentDef {
        quote: Quote::plain("DX-Y.NYB"),
        fallbacks: DOLLAR_FALLBACKS,
        display_name: "DXY",
        category_note: "Dollar index",
        unit: LevelUnit::Plain,
    }),
    listed("BTC-USD", "BTC-USD", "Bitcoin"),
    listed("ETH-USD", "ETH-USD", "Ethereum"),
    listed("SOL-USD", "SOL-USD", "Solana"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_symbols_union_in_order() {
        let symbols = manifest_symbols(US_MARKET_MANIFEST);
        assert_eq!(symbols.len(), 19);
        assert_eq!(&symbols[..4], &["^GSPC", "^NDX", "^DJI", "^RUT"]);
        assert_eq!(&symbols[4..8], &["US2Y", "^UST2Y", "^IRX", "^TNX"]);
        assert!(symbols.contains(&"DX=F".to_string()));
    }

    #[test]
    fn test_manifest_symbols_deduplicates() {
        let manifest = [
            listed("BTC-USD", "A", ""),
            listed("BTC-USD", "B", ""),
        ];
        assert_eq!(manifest_symbols(&manifest), vec!["BTC-USD".to_string()]);
    }

    #[test]
    fn test_spread_legs_precede_spread_row() {
        let position = |symbol: &str| {
            US_MARKET_MANIFEST.iter().position(|e| {
                matches!(e, ManifestEntry::Instrument(def) if def.quote.symbol == symbol)
            })
        };
        let spread = US_MARKET_MANIFEST
            .iter()
            .position(|e| matches!(e, ManifestEntry::CurveSpread(_)))
            .unwrap();
        assert!(position("^TNX").unwrap() < spread);
        assert!(position("US2Y").unwrap() < spread);
    }

    #[test]
    fn test_transforms_and_units() {
        assert_eq!(TEN_YEAR.transform.apply(45.0), 4.5);
        assert_eq!(UnitTransform::Identity.apply(3.25), 3.25);
        assert_eq!(LevelUnit::Percent.render(Reading::Available(4.5)), "4.50%");
        assert_eq!(LevelUnit::Plain.render(Reading::Available(102.0)), "102.00");
        assert_eq!(LevelUnit::BasisPoints.render(Reading::Available(40.0)), "40 bps");
        assert_eq!(LevelUnit::BasisPoints.render(Reading::Unavailable), "N/A");
    }
}
