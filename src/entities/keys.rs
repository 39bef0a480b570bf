// 🔑 Join Keys - user ids, experiment ids and record dates
// Keys are canonicalized once at load time so the joins compare plain values

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Integer-looking ids compare by value: "007" and "7" are the same key
fn canonical_key(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

// ============================================================================
// USER ID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: &str) -> Self {
        UserId(canonical_key(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn sort_key(&self) -> (u8, i64, &str) {
        match self.0.parse::<i64>() {
            Ok(n) => (0, n, self.0.as_str()),
            Err(_) => (1, 0, self.0.as_str()),
        }
    }
}

/// Numeric ids first (by value), then text ids lexicographically
impl Ord for UserId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for UserId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UserId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// ============================================================================
// EXPERIMENT ID
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExperimentId(String);

impl ExperimentId {
    pub fn new(raw: &str) -> Self {
        ExperimentId(canonical_key(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RECORD DATE
// ============================================================================

/// Date-only formats accepted for `date` columns
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Date-time formats accepted for `date` columns
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// A typed `date` value. Date-only inputs land on midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordDate(NaiveDateTime);

impl RecordDate {
    /// Parse any recognized date or date-time representation
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(RecordDate(date.and_time(NaiveTime::MIN)));
            }
        }

        for format in DATETIME_FORMATS {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
                return Some(RecordDate(datetime));
            }
        }

        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| RecordDate(dt.naive_utc()))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(|d| RecordDate(d.and_time(NaiveTime::MIN)))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.time() == NaiveTime::MIN {
            write!(f, "{}", self.0.format("%Y-%m-%d"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
        }
    }
}

impl Serialize for RecordDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_canonical() {
        assert_eq!(UserId::new(" 007 "), UserId::new("7"));
        assert_eq!(UserId::new("u-12").as_str(), "u-12");
    }

    #[test]
    fn test_user_id_ordering_numeric_first() {
        let mut ids = vec![
            UserId::new("10"),
            UserId::new("abc"),
            UserId::new("2"),
            UserId::new("1"),
        ];
        ids.sort();

        let rendered: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(rendered, vec!["1", "2", "10", "abc"]);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = RecordDate::from_ymd(2023, 1, 2).unwrap();

        assert_eq!(RecordDate::parse("2023-01-02"), Some(expected));
        assert_eq!(RecordDate::parse("2023/01/02"), Some(expected));
        assert_eq!(RecordDate::parse("01/02/2023"), Some(expected));
        assert_eq!(RecordDate::parse("02.01.2023"), Some(expected));
        assert_eq!(RecordDate::parse("2023-01-02 00:00:00"), Some(expected));
    }

    #[test]
    fn test_parse_datetime_keeps_time() {
        let date = RecordDate::parse("2023-01-02T08:30:00").unwrap();
        assert_eq!(date.to_string(), "2023-01-02 08:30:00");
        assert_ne!(Some(date), RecordDate::from_ymd(2023, 1, 2));
    }

    #[test]
    fn test_parse_rfc3339() {
        let date = RecordDate::parse("2023-01-02T10:00:00+02:00").unwrap();
        assert_eq!(date.to_string(), "2023-01-02 08:00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RecordDate::parse("yesterday").is_none());
        assert!(RecordDate::parse("2023-13-45").is_none());
        assert!(RecordDate::parse("").is_none());
    }

    #[test]
    fn test_date_display_midnight() {
        let date = RecordDate::parse("2023-01-01").unwrap();
        assert_eq!(date.to_string(), "2023-01-01");
    }
}
