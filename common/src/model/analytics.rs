use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Bucket width for time-series analytics.
    pub enum Period {
        Day => "day",
        Week => "week",
        Month => "month",
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Day
    }
}

impl Period {
    /// `%Y-%m-%d`, `%Y-%U` (Sunday-based week number) or `%Y-%m`.
    pub fn bucket(&self, date: NaiveDate) -> String {
        match self {
            Period::Day => date.format("%Y-%m-%d").to_string(),
            Period::Week => date.format("%Y-%U").to_string(),
            Period::Month => format!("{:04}-{:02}", date.year(), date.month()),
        }
    }
}

/// `_id` keeps the field name existing dashboards read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTotal {
    #[serde(rename = "_id")]
    pub id: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub users: u64,
    pub patients: u64,
    pub doctors: u64,
    pub clinics: u64,
    pub suppliers: u64,
    pub logins: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_period() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(Period::Day.bucket(date), "2025-03-09");
        assert_eq!(Period::Month.bucket(date), "2025-03");
        // 2025-03-09 is a Sunday, which opens week 10.
        assert_eq!(Period::Week.bucket(date), "2025-10");
    }
}
