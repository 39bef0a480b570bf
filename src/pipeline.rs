// 🔀 Merge Pipeline - Loader → Enricher → Combiner → Projector
//
// A pure function of four tables. Each stage consumes the previous stage's
// full output; the first error stops the run.

use crate::combiner::{self, JoinStats};
use crate::config::MergeOptions;
use crate::enricher;
use crate::error::Result;
use crate::loader;
use crate::projector::{self, FinalRecord, COLUMNS, COLUMN_TYPES};
use crate::table::Table;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;
use tracing::info;

// ============================================================================
// INPUTS
// ============================================================================

/// The four source tables
#[derive(Debug, Clone)]
pub struct MergeInputs {
    pub health: Table,
    pub usage: Table,
    pub experiments: Table,
    pub profiles: Table,
}

impl MergeInputs {
    /// Read the four CSV files
    pub fn from_csv_files(
        health: &Path,
        usage: &Path,
        experiments: &Path,
        profiles: &Path,
    ) -> Result<Self> {
        Ok(MergeInputs {
            health: Table::from_path(health)?,
            usage: Table::from_path(usage)?,
            experiments: Table::from_path(experiments)?,
            profiles: Table::from_path(profiles)?,
        })
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Row counts at each stage boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub health_rows: usize,
    pub usage_rows: usize,
    pub experiment_rows: usize,
    pub profile_rows: usize,
    pub enriched_health_rows: usize,
    pub enriched_usage_rows: usize,
    pub join: JoinStats,
    pub output_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedDataset {
    pub rows: Vec<FinalRecord>,
    pub stats: MergeStats,
}

impl MergedDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    /// Column name → value type listing of the output schema
    pub fn column_types(&self) -> &'static [(&'static str, &'static str)] {
        &COLUMN_TYPES
    }

    /// The full 12-column table
    pub fn to_table(&self) -> Result<Table> {
        projector::select(&self.rows, &COLUMNS)
    }

    /// A subset of the output columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        projector::select(&self.rows, columns)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        self.to_table()?.write_csv(writer)
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// SHA-256 of the CSV rendering; equal inputs give equal fingerprints
    pub fn fingerprint(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_csv_string()?.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Merge the four tables into the denormalized (user_id, date) table
pub fn merge_all_data(inputs: &MergeInputs, options: &MergeOptions) -> Result<MergedDataset> {
    // Stage 1: Loader/Typer
    let loaded = loader::load_all(
        &inputs.health,
        &inputs.usage,
        &inputs.experiments,
        &inputs.profiles,
    )?;

    let mut stats = MergeStats {
        health_rows: loaded.health.len(),
        usage_rows: loaded.usage.len(),
        experiment_rows: loaded.experiments.len(),
        profile_rows: loaded.profiles.len(),
        ..MergeStats::default()
    };

    // Stage 2: Enricher
    let usage = enricher::enrich_usage(
        loaded.usage,
        &loaded.experiments,
        options.dosage_unit_policy,
    )?;
    let health = enricher::enrich_health(loaded.health, &loaded.profiles)?;
    stats.enriched_usage_rows = usage.len();
    stats.enriched_health_rows = health.len();

    // Stage 3: Combiner
    let (combined, join) = combiner::combine(health, usage, &options.no_intake_label);
    stats.join = join;

    // Stage 4: Projector
    let rows = projector::project(combined, options)?;
    stats.output_rows = rows.len();

    info!(
        rows = stats.output_rows,
        matched = stats.join.matched,
        health_only = stats.join.health_only,
        usage_only = stats.join.usage_only,
        "merge complete"
    );

    Ok(MergedDataset { rows, stats })
}

/// Read four CSV files and merge them
pub fn merge_csv_files(
    health: &Path,
    usage: &Path,
    experiments: &Path,
    profiles: &Path,
    options: &MergeOptions,
) -> Result<MergedDataset> {
    let inputs = MergeInputs::from_csv_files(health, usage, experiments, profiles)?;
    merge_all_data(&inputs, options)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_group::AgeGroup;
    use crate::config::{DosageUnitPolicy, PlaceboNullPolicy};
    use crate::error::ErrorKind;

    fn inputs() -> MergeInputs {
        MergeInputs {
            health: Table::from_strings(
                "user_health_data",
                &[
                    "user_id",
                    "date",
                    "average_heart_rate",
                    "average_glucose",
                    "sleep_hours",
                    "activity_level",
                ],
                &[
                    &["1", "2023-01-01", "72", "95", "7.5h", "moderate"],
                    &["2", "2023-01-02", "80", "110", "6H", "low"],
                ],
            ),
            usage: Table::from_strings(
                "supplement_usage",
                &[
                    "user_id",
                    "date",
                    "experiment_id",
                    "supplement_name",
                    "dosage",
                    "dosage_unit",
                ],
                &[
                    &["2", "2023-01-02", "5", "Vitamin D", "500", "mg"],
                    &["3", "2023-01-03", "7", "Omega 3", "1000", "mg"],
                ],
            ),
            experiments: Table::from_strings(
                "experiments",
                &["experiment_id", "name", "is_placebo"],
                &[&["5", "VitD Trial", "False"], &["6", "Sham", "True"]],
            ),
            profiles: Table::from_strings(
                "user_profiles",
                &["user_id", "email", "age"],
                &[
                    &["1", "one@example.com", "30"],
                    &["2", "two@example.com", "17"],
                ],
            ),
        }
    }

    #[test]
    fn test_merge_all_data_end_to_end() {
        let merged = merge_all_data(&inputs(), &MergeOptions::default()).unwrap();

        assert_eq!(merged.len(), 3);

        let first = &merged.rows[0];
        assert_eq!(first.user_id.as_str(), "1");
        assert_eq!(first.user_age_group, Some(AgeGroup::From26To35));
        assert_eq!(first.supplement_name, "No intake");
        assert_eq!(first.sleep_hours, Some(7.5));
        assert_eq!(first.dosage_grams, None);
        assert_eq!(first.is_placebo, None);

        let second = &merged.rows[1];
        assert_eq!(second.experiment_name.as_deref(), Some("VitD Trial"));
        assert_eq!(second.dosage_grams, Some(0.5));
        assert_eq!(second.is_placebo, Some(false));
        assert_eq!(second.user_age_group, Some(AgeGroup::Under18));
        assert_eq!(second.sleep_hours, Some(6.0));

        // usage-only row, experiment 7 does not exist
        let third = &merged.rows[2];
        assert_eq!(third.user_id.as_str(), "3");
        assert_eq!(third.experiment_name, None);
        assert_eq!(third.email, None);
        assert_eq!(third.user_age_group, None);
        assert_eq!(third.sleep_hours, None);
        assert_eq!(third.dosage_grams, Some(1.0));
    }

    #[test]
    fn test_stats_track_each_stage() {
        let merged = merge_all_data(&inputs(), &MergeOptions::default()).unwrap();

        assert_eq!(merged.stats.health_rows, 2);
        assert_eq!(merged.stats.usage_rows, 2);
        assert_eq!(merged.stats.join.matched, 1);
        assert_eq!(merged.stats.join.health_only, 1);
        assert_eq!(merged.stats.join.usage_only, 1);
        assert_eq!(merged.stats.output_rows, 3);
    }

    #[test]
    fn test_csv_output_has_fixed_header() {
        let merged = merge_all_data(&inputs(), &MergeOptions::default()).unwrap();
        let csv = merged.to_csv_string().unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some(concat!(
                "user_id,date,email,user_age_group,experiment_name,supplement_name,",
                "dosage_grams,is_placebo,average_heart_rate,average_glucose,sleep_hours,",
                "activity_level"
            ))
        );
        assert_eq!(
            lines.next(),
            Some("1,2023-01-01,one@example.com,26-35,,No intake,,,72,95,7.5,moderate")
        );
        assert_eq!(
            lines.next(),
            Some(concat!(
                "2,2023-01-02,two@example.com,Under 18,",
                "VitD Trial,Vitamin D,0.5,false,80,110,6.0,low"
            ))
        );
        assert_eq!(
            lines.next(),
            Some("3,2023-01-03,,,,Omega 3,1.0,,,,,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let options = MergeOptions::default();
        let first = merge_all_data(&inputs(), &options).unwrap();
        let second = merge_all_data(&inputs(), &options).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
    }

    #[test]
    fn test_reject_null_placebo_fails_on_unmatched_rows() {
        let options = MergeOptions {
            placebo_null_policy: PlaceboNullPolicy::Reject,
            ..MergeOptions::default()
        };
        let err = merge_all_data(&inputs(), &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
    }

    #[test]
    fn test_grams_unit_under_both_policies() {
        let mut data = inputs();
        data.usage.rows[0][5] = Some("g".to_string());

        let assumed = merge_all_data(&data, &MergeOptions::default()).unwrap();
        assert_eq!(assumed.rows[1].dosage_grams, Some(0.5));

        let converting = MergeOptions {
            dosage_unit_policy: DosageUnitPolicy::Convert,
            ..MergeOptions::default()
        };
        let converted = merge_all_data(&data, &converting).unwrap();
        assert_eq!(converted.rows[1].dosage_grams, Some(500.0));
    }

    #[test]
    fn test_default_options_divide_any_unit_by_1000() {
        let mut data = inputs();
        data.usage.rows[0][4] = Some("1000".to_string());
        data.usage.rows[0][5] = Some("IU".to_string());
        data.usage.rows[1][4] = Some("5".to_string());
        data.usage.rows[1][5] = Some("g".to_string());

        let merged = merge_all_data(&data, &MergeOptions::default()).unwrap();
        assert_eq!(merged.rows[1].dosage_grams, Some(1.0));
        assert_eq!(merged.rows[2].dosage_grams, Some(0.005));

        let converting = MergeOptions {
            dosage_unit_policy: DosageUnitPolicy::Convert,
            ..MergeOptions::default()
        };
        let err = merge_all_data(&data, &converting).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
    }

    #[test]
    fn test_bad_date_stops_pipeline() {
        let mut data = inputs();
        data.usage.rows[1][1] = Some("someday".to_string());

        let err = merge_all_data(&data, &MergeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_select_and_column_types() {
        let merged = merge_all_data(&inputs(), &MergeOptions::default()).unwrap();

        let types = merged.column_types();
        assert_eq!(types.len(), 12);
        assert_eq!(types[3], ("user_age_group", "category"));
        assert_eq!(merged.columns()[11], "activity_level");

        let table = merged.select(&["user_id", "supplement_name"]).unwrap();
        assert_eq!(table.get(2, 1), Some("Omega 3"));
        assert!(merged.select(&["dosage"]).is_err());
    }

    #[test]
    fn test_merge_csv_fixture_files() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data");
        let merged = merge_csv_files(
            &dir.join("user_health_data.csv"),
            &dir.join("supplement_usage.csv"),
            &dir.join("experiments.csv"),
            &dir.join("user_profiles.csv"),
            &MergeOptions::default(),
        )
        .unwrap();

        assert_eq!(merged.len(), 8);
        assert_eq!(merged.stats.join.matched, 2);

        // age missing in the health row, taken from the profile
        let user_two = &merged.rows[2];
        assert_eq!(user_two.user_id.as_str(), "2");
        assert_eq!(user_two.user_age_group, Some(AgeGroup::From36To45));
        assert_eq!(user_two.is_placebo, Some(true));
        assert_eq!(user_two.dosage_grams, Some(0.25));

        // usage row with an empty dosage
        let user_six = &merged.rows[7];
        assert_eq!(user_six.supplement_name, "Zinc");
        assert_eq!(user_six.dosage_grams, None);
        assert_eq!(user_six.experiment_name, None);

        assert!(merged.rows.iter().all(|r| !r.supplement_name.is_empty()));
        assert!(merged
            .rows
            .iter()
            .filter(|r| r.sleep_hours.is_some())
            .all(|r| r.sleep_hours.unwrap() > 0.0));
    }
}
