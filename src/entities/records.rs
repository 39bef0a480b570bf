// 🧾 Input Records - the four typed source tables
//
// Only the `date` columns and the join keys are typed here.
// Every other attribute keeps its raw text until the stage that needs it
// (age and dosage in the enricher, sleep_hours and is_placebo in the projector).

use super::keys::{ExperimentId, RecordDate, UserId};

/// One row of the user health table, keyed by (user_id, date)
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub user_id: UserId,
    pub date: RecordDate,
    pub average_heart_rate: Option<String>,
    pub average_glucose: Option<String>,

    /// Text with a unit suffix, e.g. "7.5h"
    pub sleep_hours: Option<String>,
    pub activity_level: Option<String>,

    /// Present only when the health table carries an `age` column
    pub age: Option<String>,
}

/// One row of the supplement usage table, keyed by (user_id, date)
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub user_id: UserId,
    pub date: RecordDate,

    /// Null ids never match an experiment
    pub experiment_id: Option<ExperimentId>,
    pub supplement_name: Option<String>,
    pub dosage: Option<String>,
    pub dosage_unit: Option<String>,
}

/// Experiment metadata, keyed by experiment_id
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub experiment_id: Option<ExperimentId>,
    pub name: Option<String>,

    /// Boolean-like text ("True", "0", "yes", ...)
    pub is_placebo: Option<String>,
}

/// User profile, keyed by user_id
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub age: Option<String>,
}
