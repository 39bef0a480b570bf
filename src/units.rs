// 📏 Units & Value Coercion - dosage units, sleep hours, booleans
// Small pure helpers shared by the enricher and the projector

use crate::error::{MergeError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// DOSAGE UNIT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DosageUnit {
    Micrograms,
    Milligrams,
    Grams,
}

impl DosageUnit {
    /// Recognize a unit label, case-insensitive
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "mg" | "milligram" | "milligrams" => Some(DosageUnit::Milligrams),
            "g" | "gram" | "grams" => Some(DosageUnit::Grams),
            "mcg" | "ug" | "µg" | "μg" | "microgram" | "micrograms" => {
                Some(DosageUnit::Micrograms)
            }
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            DosageUnit::Micrograms => "mcg",
            DosageUnit::Milligrams => "mg",
            DosageUnit::Grams => "g",
        }
    }

    /// Convert an amount in this unit to grams
    pub fn to_grams(&self, amount: f64) -> f64 {
        match self {
            DosageUnit::Micrograms => amount / 1_000_000.0,
            DosageUnit::Milligrams => amount / 1000.0,
            DosageUnit::Grams => amount,
        }
    }
}

// ============================================================================
// NUMBERS
// ============================================================================

/// Parse a numeric cell, reporting the column on failure
pub fn parse_number(column: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| MergeError::format(column, raw, "expected a number"))
}

// ============================================================================
// SLEEP HOURS
// ============================================================================

/// Strip the trailing "h"/"H" unit letters from a sleep value and parse the rest.
///
/// `"7.5h"` -> 7.5, `"8H"` -> 8.0. Without a suffix the value is accepted unless
/// `require_suffix` is set.
pub fn parse_sleep_hours(raw: &str, require_suffix: bool) -> Result<f64> {
    let value = raw.trim();
    let stripped = value.trim_end_matches(['h', 'H']);

    if require_suffix && stripped.len() == value.len() {
        return Err(MergeError::format(
            "sleep_hours",
            raw,
            "missing trailing 'h' unit suffix",
        ));
    }

    let number = stripped.trim();
    if number.is_empty() {
        return Err(MergeError::format("sleep_hours", raw, "no number before unit suffix"));
    }

    let hours = number
        .parse::<f64>()
        .map_err(|_| MergeError::format("sleep_hours", raw, "not numeric after stripping unit"))?;

    if hours.is_nan() {
        return Err(MergeError::format("sleep_hours", raw, "not numeric after stripping unit"));
    }

    Ok(hours)
}

// ============================================================================
// BOOLEANS
// ============================================================================

/// Strict boolean coercion for `is_placebo`-style flags
pub fn parse_bool(column: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Ok(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Ok(false),
        _ => Err(MergeError::format(column, raw, "not a recognized boolean")),
    }
}

// ============================================================================
// TESTS
// ============================================================================
