// ⚙️ Merge Options - the explicit knobs behind the pipeline's policies
// Loaded from JSON the same way classification rules are, or built in code.

use crate::error::{MergeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sentinel written to `supplement_name` when a row has no usage record
pub const DEFAULT_NO_INTAKE_LABEL: &str = "No intake";

// ============================================================================
// POLICIES
// ============================================================================

/// How `dosage` is turned into grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageUnitPolicy {
    /// `dosage / 1000` whatever `dosage_unit` says
    #[default]
    AssumeMilligrams,

    /// Read `dosage_unit` and convert mg / g / mcg; a null unit means milligrams.
    /// Unknown units are a FormatError.
    Convert,
}

/// What a null `is_placebo` becomes in the final table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceboNullPolicy {
    /// Keep it null (tri-state: true / false / unknown)
    #[default]
    Keep,

    /// Treat a null as a FormatError
    Reject,
}

// ============================================================================
// MERGE OPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub dosage_unit_policy: DosageUnitPolicy,

    /// When true, a `sleep_hours` value without a trailing "h"/"H" is a FormatError
    pub require_sleep_suffix: bool,

    pub placebo_null_policy: PlaceboNullPolicy,

    /// Value filled into `supplement_name` for rows without intake
    pub no_intake_label: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            dosage_unit_policy: DosageUnitPolicy::default(),
            require_sleep_suffix: false,
            placebo_null_policy: PlaceboNullPolicy::default(),
            no_intake_label: DEFAULT_NO_INTAKE_LABEL.to_string(),
        }
    }
}

impl MergeOptions {
    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let options: MergeOptions = serde_json::from_str(content)
            .map_err(|e| MergeError::Config(e.to_string()))?;

        if options.no_intake_label.trim().is_empty() {
            return Err(MergeError::Config(
                "no_intake_label must not be empty".to_string(),
            ));
        }

        Ok(options)
    }
}

// ============================================================================
// TESTS
// ============================================================================
