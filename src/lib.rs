// Supplement Merge - Core Library
// Merges health records, supplement usage, experiments and profiles
// into one denormalized (user_id, date) table

pub mod error;
pub mod table;
pub mod entities;
pub mod config;
pub mod units;
pub mod age_group;
pub mod loader;     // Stage 1: Loader/Typer
pub mod enricher;   // Stage 2: Enricher
pub mod combiner;   // Stage 3: Combiner
pub mod projector;  // Stage 4: Projector
pub mod pipeline;
pub mod logging;

// Re-export commonly used types
pub use error::{ErrorKind, MergeError, Result};
pub use table::Table;
pub use entities::{
    Experiment, ExperimentId, HealthRecord, Profile, RecordDate, UsageRecord, UserId,
};
pub use config::{DosageUnitPolicy, MergeOptions, PlaceboNullPolicy};
pub use units::DosageUnit;
pub use age_group::AgeGroup;
pub use enricher::{EnrichedHealth, EnrichedUsage};
pub use combiner::{CombinedRecord, JoinStats};
pub use projector::{FinalRecord, COLUMNS};
pub use pipeline::{
    merge_all_data, merge_csv_files, MergeInputs, MergeStats, MergedDataset,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
