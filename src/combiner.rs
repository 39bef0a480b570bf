// 🔗 Combiner - outer join of enriched health and usage on (user_id, date)
//
// Every (user_id, date) pair from either side survives. Fields of the missing
// side are null, then the fill policy runs: supplement_name gets the
// "No intake" sentinel, dosage_grams / is_placebo / experiment_name stay null.

use crate::age_group::AgeGroup;
use crate::enricher::{EnrichedHealth, EnrichedUsage};
use crate::entities::{ExperimentId, RecordDate, UserId};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

type JoinKey = (UserId, RecordDate);

// ============================================================================
// COMBINED RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRecord {
    pub user_id: UserId,
    pub date: RecordDate,

    // From EnrichedHealth (null on usage-only rows)
    pub email: Option<String>,
    pub user_age_group: Option<AgeGroup>,
    pub average_heart_rate: Option<String>,
    pub average_glucose: Option<String>,
    pub sleep_hours: Option<String>,
    pub activity_level: Option<String>,

    // From EnrichedUsage (null on health-only rows)
    pub experiment_id: Option<ExperimentId>,
    pub experiment_name: Option<String>,
    pub supplement_name: Option<String>,
    pub dosage_grams: Option<f64>,
    pub is_placebo: Option<String>,
}

impl CombinedRecord {
    fn join(key: &JoinKey, health: Option<&EnrichedHealth>, usage: Option<&EnrichedUsage>) -> Self {
        CombinedRecord {
            user_id: key.0.clone(),
            date: key.1,
            email: health.and_then(|h| h.email.clone()),
            user_age_group: health.map(|h| h.user_age_group),
            average_heart_rate: health.and_then(|h| h.average_heart_rate.clone()),
            average_glucose: health.and_then(|h| h.average_glucose.clone()),
            sleep_hours: health.and_then(|h| h.sleep_hours.clone()),
            activity_level: health.and_then(|h| h.activity_level.clone()),
            experiment_id: usage.and_then(|u| u.experiment_id.clone()),
            experiment_name: usage.and_then(|u| u.experiment_name.clone()),
            supplement_name: usage.and_then(|u| u.supplement_name.clone()),
            dosage_grams: usage.and_then(|u| u.dosage_grams),
            is_placebo: usage.and_then(|u| u.is_placebo.clone()),
        }
    }
}

/// Row counts of one outer join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Rows whose key appears on both sides
    pub matched: usize,
    pub health_only: usize,
    pub usage_only: usize,
}

impl JoinStats {
    pub fn total(&self) -> usize {
        self.matched + self.health_only + self.usage_only
    }
}

// ============================================================================
// OUTER JOIN
// ============================================================================

fn group_by_key<T, F>(rows: Vec<T>, key: F) -> BTreeMap<JoinKey, Vec<T>>
where
    F: Fn(&T) -> JoinKey,
{
    let mut groups: BTreeMap<JoinKey, Vec<T>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
}

/// Outer join on (user_id, date). Output is ordered by key; within a key,
/// health rows drive and usage rows follow their input order.
pub fn outer_join(
    health: Vec<EnrichedHealth>,
    usage: Vec<EnrichedUsage>,
) -> (Vec<CombinedRecord>, JoinStats) {
    let mut health_groups = group_by_key(health, |h| (h.user_id.clone(), h.date));
    let mut usage_groups = group_by_key(usage, |u| (u.user_id.clone(), u.date));

    let mut keys: Vec<JoinKey> = health_groups.keys().cloned().collect();
    keys.extend(usage_groups.keys().cloned());
    keys.sort();
    keys.dedup();

    let mut combined = Vec::new();
    let mut stats = JoinStats::default();

    for key in keys {
        let health_rows = health_groups.remove(&key).unwrap_or_default();
        let usage_rows = usage_groups.remove(&key).unwrap_or_default();

        match (health_rows.is_empty(), usage_rows.is_empty()) {
            (false, false) => {
                for h in &health_rows {
                    for u in &usage_rows {
                        combined.push(CombinedRecord::join(&key, Some(h), Some(u)));
                        stats.matched += 1;
                    }
                }
            }
            (false, true) => {
                for h in &health_rows {
                    combined.push(CombinedRecord::join(&key, Some(h), None));
                    stats.health_only += 1;
                }
            }
            (true, false) => {
                for u in &usage_rows {
                    combined.push(CombinedRecord::join(&key, None, Some(u)));
                    stats.usage_only += 1;
                }
            }
            (true, true) => {}
        }
    }

    (combined, stats)
}

// ============================================================================
// MISSING-VALUE POLICY
// ============================================================================

/// supplement_name → sentinel; dosage_grams NaN → null; the rest stay nullable
pub fn fill_missing(rows: &mut [CombinedRecord], no_intake_label: &str) {
    for row in rows.iter_mut() {
        if row.supplement_name.is_none() {
            row.supplement_name = Some(no_intake_label.to_string());
        }

        if row.dosage_grams.is_some_and(f64::is_nan) {
            row.dosage_grams = None;
        }
    }
}

/// Run the Combiner stage: outer join followed by the fill policy
pub fn combine(
    health: Vec<EnrichedHealth>,
    usage: Vec<EnrichedUsage>,
    no_intake_label: &str,
) -> (Vec<CombinedRecord>, JoinStats) {
    let (mut rows, stats) = outer_join(health, usage);
    fill_missing(&mut rows, no_intake_label);

    debug!(
        rows = rows.len(),
        matched = stats.matched,
        health_only = stats.health_only,
        usage_only = stats.usage_only,
        "combined health and usage"
    );

    (rows, stats)
}

// ============================================================================
// TESTS
// ============================================================================
