// 👥 Age Groups - categorical bucket derived from a user's age
//
// Whole-year boundaries are inclusive on both ends ("18-25" holds 18 and 25).
// Fractional ages fall into the bucket of their whole year, so 25.5 is "18-25".

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeGroup {
    Unknown,
    Under18,
    From18To25,
    From26To35,
    From36To45,
    From46To55,
    From56To65,
    Over65,
}

impl AgeGroup {
    /// Every label, in ascending age order
    pub const ALL: [AgeGroup; 8] = [
        AgeGroup::Unknown,
        AgeGroup::Under18,
        AgeGroup::From18To25,
        AgeGroup::From26To35,
        AgeGroup::From36To45,
        AgeGroup::From46To55,
        AgeGroup::From56To65,
        AgeGroup::Over65,
    ];

    /// Bucket an age; None (and NaN) is Unknown
    pub fn categorize(age: Option<f64>) -> Self {
        let age = match age {
            Some(a) if !a.is_nan() => a,
            _ => return AgeGroup::Unknown,
        };

        if age < 18.0 {
            AgeGroup::Under18
        } else if age < 26.0 {
            AgeGroup::From18To25
        } else if age < 36.0 {
            AgeGroup::From26To35
        } else if age < 46.0 {
            AgeGroup::From36To45
        } else if age < 56.0 {
            AgeGroup::From46To55
        } else if age < 66.0 {
            AgeGroup::From56To65
        } else {
            AgeGroup::Over65
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Unknown => "Unknown",
            AgeGroup::Under18 => "Under 18",
            AgeGroup::From18To25 => "18-25",
            AgeGroup::From26To35 => "26-35",
            AgeGroup::From36To45 => "36-45",
            AgeGroup::From46To55 => "46-55",
            AgeGroup::From56To65 => "56-65",
            AgeGroup::Over65 => "Over 65",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        AgeGroup::ALL.into_iter().find(|g| g.label() == label)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgeGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_for_missing() {
        assert_eq!(AgeGroup::categorize(None), AgeGroup::Unknown);
        assert_eq!(AgeGroup::categorize(Some(f64::NAN)), AgeGroup::Unknown);
    }

    #[test]
    fn test_inclusive_boundaries() {
        let cases = [
            (0.0, "Under 18"),
            (17.0, "Under 18"),
            (18.0, "18-25"),
            (25.0, "18-25"),
            (26.0, "26-35"),
            (35.0, "26-35"),
            (36.0, "36-45"),
            (45.0, "36-45"),
            (46.0, "46-55"),
            (55.0, "46-55"),
            (56.0, "56-65"),
            (65.0, "56-65"),
            (66.0, "Over 65"),
            (104.0, "Over 65"),
        ];

        for (age, label) in cases {
            assert_eq!(AgeGroup::categorize(Some(age)).label(), label, "age {}", age);
        }
    }

    #[test]
    fn test_fractional_ages_between_buckets() {
        assert_eq!(AgeGroup::categorize(Some(17.9)), AgeGroup::Under18);
        assert_eq!(AgeGroup::categorize(Some(25.5)), AgeGroup::From18To25);
        assert_eq!(AgeGroup::categorize(Some(65.5)), AgeGroup::From56To65);
    }

    #[test]
    fn test_label_round_trip_for_all_groups() {
        for group in AgeGroup::ALL {
            assert_eq!(AgeGroup::from_label(group.label()), Some(group));
        }
        assert_eq!(AgeGroup::from_label("Teen"), None);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&AgeGroup::From26To35).unwrap();
        assert_eq!(json, "\"26-35\"");
    }
}
