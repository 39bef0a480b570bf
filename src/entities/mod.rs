// Entity Models
// Typed rows of the four source tables plus the keys they are joined on

pub mod keys;
pub mod records;

pub use keys::{ExperimentId, RecordDate, UserId};
pub use records::{Experiment, HealthRecord, Profile, UsageRecord};
