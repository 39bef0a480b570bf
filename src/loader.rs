// 📥 Loader/Typer - raw tables → typed records
//
// First pipeline stage. Checks that every required column exists, parses the
// join keys and the `date` columns. No other value is coerced here.

use crate::entities::{
    Experiment, ExperimentId, HealthRecord, Profile, RecordDate, UsageRecord, UserId,
};
use crate::error::{MergeError, Result};
use crate::table::Table;
use tracing::debug;

pub const HEALTH_COLUMNS: &[&str] = &[
    "user_id",
    "date",
    "average_heart_rate",
    "average_glucose",
    "sleep_hours",
    "activity_level",
];

pub const USAGE_COLUMNS: &[&str] = &[
    "user_id",
    "date",
    "experiment_id",
    "supplement_name",
    "dosage",
    "dosage_unit",
];

pub const EXPERIMENT_COLUMNS: &[&str] = &["experiment_id", "name", "is_placebo"];

pub const PROFILE_COLUMNS: &[&str] = &["user_id", "email"];

/// Typed output of the Loader/Typer stage
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub health: Vec<HealthRecord>,
    pub usage: Vec<UsageRecord>,
    pub experiments: Vec<Experiment>,
    pub profiles: Vec<Profile>,
}

// ============================================================================
// COLUMN LOOKUP
// ============================================================================

/// Resolved positions of a table's required columns
struct Columns<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> Columns<'a> {
    fn resolve(table: &'a Table, required: &[&str]) -> Result<Self> {
        let indices = required
            .iter()
            .map(|column| table.column_index(column))
            .collect::<Result<Vec<_>>>()?;
        Ok(Columns { table, indices })
    }

    /// Cell of the n-th required column
    fn cell(&self, row: usize, n: usize) -> Option<String> {
        self.table.get(row, self.indices[n]).map(str::to_string)
    }
}

/// Line number as seen in the source file (1-indexed + header row)
fn line_of(row: usize) -> usize {
    row + 2
}

fn require_user_id(table: &Table, row: usize, raw: Option<String>) -> Result<UserId> {
    raw.map(|id| UserId::new(&id))
        .ok_or_else(|| MergeError::parse(&table.name, line_of(row), "user_id", "missing user_id"))
}

fn parse_date(table: &Table, row: usize, raw: Option<String>) -> Result<RecordDate> {
    let raw = raw.ok_or_else(|| {
        MergeError::parse(&table.name, line_of(row), "date", "missing date")
    })?;

    RecordDate::parse(&raw).ok_or_else(|| {
        MergeError::parse(
            &table.name,
            line_of(row),
            "date",
            format!("unrecognized date format: {:?}", raw),
        )
    })
}

fn optional_column(table: &Table, column: &str) -> Option<usize> {
    table.headers.iter().position(|h| h == column)
}

// ============================================================================
// PER-TABLE LOADERS
// ============================================================================

pub fn load_health(table: &Table) -> Result<Vec<HealthRecord>> {
    let cols = Columns::resolve(table, HEALTH_COLUMNS)?;
    let age_idx = optional_column(table, "age");

    (0..table.len())
        .map(|row| {
            Ok(HealthRecord {
                user_id: require_user_id(table, row, cols.cell(row, 0))?,
                date: parse_date(table, row, cols.cell(row, 1))?,
                average_heart_rate: cols.cell(row, 2),
                average_glucose: cols.cell(row, 3),
                sleep_hours: cols.cell(row, 4),
                activity_level: cols.cell(row, 5),
                age: age_idx.and_then(|idx| table.get(row, idx)).map(str::to_string),
            })
        })
        .collect()
}

pub fn load_usage(table: &Table) -> Result<Vec<UsageRecord>> {
    let cols = Columns::resolve(table, USAGE_COLUMNS)?;

    (0..table.len())
        .map(|row| {
            Ok(UsageRecord {
                user_id: require_user_id(table, row, cols.cell(row, 0))?,
                date: parse_date(table, row, cols.cell(row, 1))?,
                experiment_id: cols.cell(row, 2).map(|id| ExperimentId::new(&id)),
                supplement_name: cols.cell(row, 3),
                dosage: cols.cell(row, 4),
                dosage_unit: cols.cell(row, 5),
            })
        })
        .collect()
}

pub fn load_experiments(table: &Table) -> Result<Vec<Experiment>> {
    let cols = Columns::resolve(table, EXPERIMENT_COLUMNS)?;

    Ok((0..table.len())
        .map(|row| Experiment {
            experiment_id: cols.cell(row, 0).map(|id| ExperimentId::new(&id)),
            name: cols.cell(row, 1),
            is_placebo: cols.cell(row, 2),
        })
        .collect())
}

pub fn load_profiles(table: &Table) -> Result<Vec<Profile>> {
    let cols = Columns::resolve(table, PROFILE_COLUMNS)?;
    let age_idx = optional_column(table, "age");

    Ok((0..table.len())
        .map(|row| Profile {
            user_id: cols.cell(row, 0).map(|id| UserId::new(&id)),
            email: cols.cell(row, 1),
            age: age_idx.and_then(|idx| table.get(row, idx)).map(str::to_string),
        })
        .collect())
}

/// Run the Loader/Typer stage over all four tables
pub fn load_all(
    health: &Table,
    usage: &Table,
    experiments: &Table,
    profiles: &Table,
) -> Result<LoadedData> {
    // age is consumed once, from health or profile (health wins)
    if !health.has_column("age") && !profiles.has_column("age") {
        return Err(MergeError::schema(&health.name, "age"));
    }

    let loaded = LoadedData {
        health: load_health(health)?,
        usage: load_usage(usage)?,
        experiments: load_experiments(experiments)?,
        profiles: load_profiles(profiles)?,
    };

    debug!(
        health = loaded.health.len(),
        usage = loaded.usage.len(),
        experiments = loaded.experiments.len(),
        profiles = loaded.profiles.len(),
        "loaded input tables"
    );

    Ok(loaded)
}

// ============================================================================
// TESTS
// ============================================================================
