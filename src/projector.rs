// 🎯 Projector - final coercions and the fixed 12-column output schema
//
// Order of operations:
//   1. sleep_hours: strip trailing "h"/"H", parse as f64   (every row)
//   2. is_placebo: strict boolean                          (every row)
//   3. select the output columns in their fixed order

use crate::age_group::AgeGroup;
use crate::combiner::CombinedRecord;
use crate::config::{MergeOptions, PlaceboNullPolicy};
use crate::entities::{RecordDate, UserId};
use crate::error::{MergeError, Result};
use crate::table::Table;
use crate::units::{parse_bool, parse_sleep_hours};
use serde::Serialize;

/// Output columns, in order
pub const COLUMNS: [&str; 12] = [
    "user_id",
    "date",
    "email",
    "user_age_group",
    "experiment_name",
    "supplement_name",
    "dosage_grams",
    "is_placebo",
    "average_heart_rate",
    "average_glucose",
    "sleep_hours",
    "activity_level",
];

/// Value type of each output column, in `COLUMNS` order
pub const COLUMN_TYPES: [(&str, &str); 12] = [
    ("user_id", "string"),
    ("date", "date"),
    ("email", "string"),
    ("user_age_group", "category"),
    ("experiment_name", "string"),
    ("supplement_name", "string"),
    ("dosage_grams", "float64"),
    ("is_placebo", "bool"),
    ("average_heart_rate", "string"),
    ("average_glucose", "string"),
    ("sleep_hours", "float64"),
    ("activity_level", "string"),
];

// ============================================================================
// FINAL RECORD
// ============================================================================

/// One output row. Field order matches `COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalRecord {
    pub user_id: UserId,
    pub date: RecordDate,
    pub email: Option<String>,
    pub user_age_group: Option<AgeGroup>,
    pub experiment_name: Option<String>,

    /// Never null: "No intake" when the row had no usage record
    pub supplement_name: String,
    pub dosage_grams: Option<f64>,
    pub is_placebo: Option<bool>,
    pub average_heart_rate: Option<String>,
    pub average_glucose: Option<String>,
    pub sleep_hours: Option<f64>,
    pub activity_level: Option<String>,
}

fn render_float(value: f64) -> String {
    format!("{:?}", value)
}

fn column_position(column: &str) -> Result<usize> {
    COLUMNS
        .iter()
        .position(|c| *c == column)
        .ok_or_else(|| MergeError::schema("merged", column))
}

impl FinalRecord {
    /// Text values of every output column, in `COLUMNS` order
    pub fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.user_id.to_string()),
            Some(self.date.to_string()),
            self.email.clone(),
            self.user_age_group.map(|g| g.label().to_string()),
            self.experiment_name.clone(),
            Some(self.supplement_name.clone()),
            self.dosage_grams.map(render_float),
            self.is_placebo.map(|b| b.to_string()),
            self.average_heart_rate.clone(),
            self.average_glucose.clone(),
            self.sleep_hours.map(render_float),
            self.activity_level.clone(),
        ]
    }

    /// Text value of a named output column; Err for unknown columns
    pub fn value(&self, column: &str) -> Result<Option<String>> {
        let position = column_position(column)?;
        Ok(self.values().swap_remove(position))
    }
}

/// Select named columns from projected rows into a table.
/// Any column outside the output schema is a SchemaError.
pub fn select(rows: &[FinalRecord], columns: &[&str]) -> Result<Table> {
    let positions = columns
        .iter()
        .map(|column| column_position(column))
        .collect::<Result<Vec<_>>>()?;

    let table_rows = rows
        .iter()
        .map(|row| {
            let values = row.values();
            positions.iter().map(|&i| values[i].clone()).collect()
        })
        .collect();

    Ok(Table::new(
        "merged",
        columns.iter().map(|c| c.to_string()).collect(),
        table_rows,
    ))
}

// ============================================================================
// COERCIONS
// ============================================================================

fn coerce_placebo(raw: Option<&str>, policy: PlaceboNullPolicy) -> Result<Option<bool>> {
    match (raw, policy) {
        (Some(value), _) => parse_bool("is_placebo", value).map(Some),
        (None, PlaceboNullPolicy::Keep) => Ok(None),
        (None, PlaceboNullPolicy::Reject) => Err(MergeError::format(
            "is_placebo",
            "",
            "missing value cannot be coerced to a boolean",
        )),
    }
}

/// Run the Projector stage
pub fn project(rows: Vec<CombinedRecord>, options: &MergeOptions) -> Result<Vec<FinalRecord>> {
    let sleep = rows
        .iter()
        .map(|row| {
            row.sleep_hours
                .as_deref()
                .map(|raw| parse_sleep_hours(raw, options.require_sleep_suffix))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;

    let placebo = rows
        .iter()
        .map(|row| coerce_placebo(row.is_placebo.as_deref(), options.placebo_null_policy))
        .collect::<Result<Vec<_>>>()?;

    Ok(rows
        .into_iter()
        .zip(sleep)
        .zip(placebo)
        .map(|((row, sleep_hours), is_placebo)| FinalRecord {
            user_id: row.user_id,
            date: row.date,
            email: row.email,
            user_age_group: row.user_age_group,
            experiment_name: row.experiment_name,
            supplement_name: row
                .supplement_name
                .unwrap_or_else(|| options.no_intake_label.clone()),
            dosage_grams: row.dosage_grams,
            is_placebo,
            average_heart_rate: row.average_heart_rate,
            average_glucose: row.average_glucose,
            sleep_hours,
            activity_level: row.activity_level,
        })
        .collect())
}

// ============================================================================
// TESTS
// ============================================================================
