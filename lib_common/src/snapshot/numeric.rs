//! # Numeric Utilities
//!
//! Percentage-change arithmetic that never fails. Every degenerate input
//! (missing value, NaN, infinity, zero base) collapses into
//! [`Reading::Unavailable`], so callers can treat every instrument the same
//! way regardless of upstream data quality.

use serde::Serialize;
use std::fmt;

/// Text rendered wherever a value is unavailable.
pub const UNAVAILABLE: &str = "N/A";

/// # Reading
///
/// A numeric value that is either present and finite, or explicitly
/// unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Reading {
    /// A finite value.
    Available(f64),
    /// No valid data for this field.
    Unavailable,
}

impl Reading {
    /// Wraps `value`, mapping non-finite numbers to `Unavailable`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() {
            Reading::Available(value)
        } else {
            Reading::Unavailable
        }
    }

    /// The inner value, if available.
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Available(v) => Some(v),
            Reading::Unavailable => None,
        }
    }

    /// Returns `true` for `Available`.
    pub fn is_available(self) -> bool {
        matches!(self, Reading::Available(_))
    }

    /// Applies `f` to an available value, re-checking finiteness of the result.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Reading::Available(v) => Reading::from_f64(f(v)),
            Reading::Unavailable => Reading::Unavailable,
        }
    }

    /// Formats the value with `decimals` places followed by `suffix`, or
    /// [`UNAVAILABLE`].
    pub fn format(self, decimals: usize, suffix: &str) -> String {
        match self {
            Reading::Available(v) => format!("{:.*}{}", decimals, v, suffix),
            Reading::Unavailable => UNAVAILABLE.to_string(),
        }
    }
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Reading::Unavailable, Reading::from_f64)
    }
}

impl fmt::Display for Reading {
    /// Two-decimal percentage, e.g. `1.25%`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(2, "%"))
    }
}

/// Computes `(current / reference - 1) * 100`.
///
/// Unavailable when either input is non-finite, when `reference` is zero, or
/// when the division overflows.
pub fn percentage_change(current: f64, reference: f64) -> Reading {
    if !current.is_finite() || !reference.is_finite() || reference == 0.0 {
        return Reading::Unavailable;
    }
    Reading::from_f64((current / reference - 1.0) * 100.0)
}

/// [`percentage_change`] over readings that may already be unavailable.
pub fn change_between(current: Reading, reference: Reading) -> Reading {
    match (current, reference) {
        (Reading::Available(c), Reading::Available(r)) => percentage_change(c, r),
        _ => Reading::Unavailable,
    }
}
