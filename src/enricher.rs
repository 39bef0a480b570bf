// 🧪 Enricher - attach experiment and profile metadata, derive fields
//
// Two independent left joins:
//   usage  ⟕ experiments  on experiment_id  → EnrichedUsage
//   health ⟕ profiles     on user_id        → EnrichedHealth
// The left side always survives; a key with several matches yields one row per match.

use crate::age_group::AgeGroup;
use crate::config::DosageUnitPolicy;
use crate::entities::{
    Experiment, ExperimentId, HealthRecord, Profile, RecordDate, UsageRecord, UserId,
};
use crate::error::{MergeError, Result};
use crate::units::{parse_number, DosageUnit};
use std::collections::HashMap;
use tracing::{debug, warn};

// ============================================================================
// ENRICHED RECORDS
// ============================================================================

/// Usage row joined with its experiment; raw dosage replaced by grams
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedUsage {
    pub user_id: UserId,
    pub date: RecordDate,
    pub experiment_id: Option<ExperimentId>,
    pub supplement_name: Option<String>,
    pub dosage_grams: Option<f64>,

    /// Experiment `name`, renamed
    pub experiment_name: Option<String>,
    pub is_placebo: Option<String>,
}

/// Health row joined with its profile; raw age replaced by an age group
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedHealth {
    pub user_id: UserId,
    pub date: RecordDate,
    pub average_heart_rate: Option<String>,
    pub average_glucose: Option<String>,
    pub sleep_hours: Option<String>,
    pub activity_level: Option<String>,
    pub email: Option<String>,
    pub user_age_group: AgeGroup,
}

// ============================================================================
// USAGE ENRICHMENT
// ============================================================================

/// Convert a raw dosage to grams under the given unit policy
pub fn dosage_to_grams(
    dosage: Option<&str>,
    unit: Option<&str>,
    policy: DosageUnitPolicy,
) -> Result<Option<f64>> {
    let Some(raw) = dosage else {
        return Ok(None);
    };
    let amount = parse_number("dosage", raw)?;

    let unit = match policy {
        DosageUnitPolicy::AssumeMilligrams => DosageUnit::Milligrams,
        DosageUnitPolicy::Convert => match unit {
            None => DosageUnit::Milligrams,
            Some(label) => DosageUnit::parse(label).ok_or_else(|| {
                MergeError::format("dosage_unit", label, "unknown dosage unit")
            })?,
        },
    };

    Ok(Some(unit.to_grams(amount)))
}

pub fn enrich_usage(
    usage: Vec<UsageRecord>,
    experiments: &[Experiment],
    policy: DosageUnitPolicy,
) -> Result<Vec<EnrichedUsage>> {
    let mut by_id: HashMap<&ExperimentId, Vec<&Experiment>> = HashMap::new();
    for experiment in experiments {
        if let Some(id) = &experiment.experiment_id {
            by_id.entry(id).or_default().push(experiment);
        }
    }

    let mut enriched = Vec::with_capacity(usage.len());
    let mut unmatched = 0usize;

    for record in usage {
        let dosage_grams = dosage_to_grams(
            record.dosage.as_deref(),
            record.dosage_unit.as_deref(),
            policy,
        )?;

        let matches = record
            .experiment_id
            .as_ref()
            .and_then(|id| by_id.get(id))
            .map(|found| found.as_slice())
            .unwrap_or(&[]);

        if matches.is_empty() {
            if record.experiment_id.is_some() {
                unmatched += 1;
            }
            enriched.push(EnrichedUsage {
                user_id: record.user_id,
                date: record.date,
                experiment_id: record.experiment_id,
                supplement_name: record.supplement_name,
                dosage_grams,
                experiment_name: None,
                is_placebo: None,
            });
            continue;
        }

        for experiment in matches {
            enriched.push(EnrichedUsage {
                user_id: record.user_id.clone(),
                date: record.date,
                experiment_id: record.experiment_id.clone(),
                supplement_name: record.supplement_name.clone(),
                dosage_grams,
                experiment_name: experiment.name.clone(),
                is_placebo: experiment.is_placebo.clone(),
            });
        }
    }

    if unmatched > 0 {
        warn!(unmatched, "usage rows reference unknown experiment ids");
    }
    debug!(rows = enriched.len(), "usage enriched with experiments");

    Ok(enriched)
}

// ============================================================================
// HEALTH ENRICHMENT
// ============================================================================

/// Age group from a raw age cell; a non-numeric age is a FormatError
pub fn categorize_age(raw: Option<&str>) -> Result<AgeGroup> {
    let age = raw.map(|value| parse_number("age", value)).transpose()?;
    Ok(AgeGroup::categorize(age))
}

pub fn enrich_health(
    health: Vec<HealthRecord>,
    profiles: &[Profile],
) -> Result<Vec<EnrichedHealth>> {
    let mut by_user: HashMap<&UserId, Vec<&Profile>> = HashMap::new();
    for profile in profiles {
        if let Some(id) = &profile.user_id {
            by_user.entry(id).or_default().push(profile);
        }
    }

    let mut enriched = Vec::with_capacity(health.len());
    let mut unmatched = 0usize;

    for record in health {
        let matches: Vec<Option<&Profile>> = match by_user.get(&record.user_id) {
            Some(found) => found.iter().copied().map(Some).collect(),
            None => {
                unmatched += 1;
                vec![None]
            }
        };

        for profile in matches {
            let age = record
                .age
                .as_deref()
                .or_else(|| profile.and_then(|p| p.age.as_deref()));

            enriched.push(EnrichedHealth {
                user_id: record.user_id.clone(),
                date: record.date,
                average_heart_rate: record.average_heart_rate.clone(),
                average_glucose: record.average_glucose.clone(),
                sleep_hours: record.sleep_hours.clone(),
                activity_level: record.activity_level.clone(),
                email: profile.and_then(|p| p.email.clone()),
                user_age_group: categorize_age(age)?,
            });
        }
    }

    if unmatched > 0 {
        warn!(unmatched, "health rows without a user profile");
    }
    debug!(rows = enriched.len(), "health enriched with profiles");

    Ok(enriched)
}

// ============================================================================
// TESTS
// ============================================================================
