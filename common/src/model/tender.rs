//! Procurement requests published by clinics and the marketplace listing
//! rules applied to them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenders worth at least this much are listed as "high value".
pub const HIGH_VALUE_THRESHOLD: f64 = 100_000.0;

/// Days before the deadline during which a tender is "closing soon".
pub const CLOSING_SOON_DAYS: i64 = 7;

string_enum! {
    pub enum TenderStatus {
        Open => "open",
        Closed => "closed",
    }
}

string_enum! {
    pub enum Urgency {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Urgency {
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::High => 3,
            Urgency::Medium => 2,
            Urgency::Low => 1,
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Medium
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: String,
    pub clinic_id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub requirements: Vec<String>,
    pub budget: Option<f64>,
    pub estimated_value: Option<f64>,
    pub deadline: DateTime<Utc>,
    pub status: TenderStatus,
    /// Supplier user ids, each at most once.
    pub applicants: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub clinic_name: String,
    pub urgency: Urgency,
    pub location: String,
    pub contact_person: Option<String>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub evaluation_criteria: Vec<String>,
}

impl Tender {
    /// Budget if set, otherwise the estimated value, otherwise zero.
    pub fn value(&self) -> f64 {
        self.budget.or(self.estimated_value).unwrap_or(0.0)
    }

    /// Whole days left, rounded up; negative once the deadline passed.
    pub fn days_until_deadline(&self, now: DateTime<Utc>) -> i64 {
        let secs = (self.deadline - now).num_seconds();
        secs.div_euclid(86_400) + i64::from(secs.rem_euclid(86_400) != 0)
    }

    pub fn is_closing_soon(&self, now: DateTime<Utc>) -> bool {
        self.days_until_deadline(now) <= CLOSING_SOON_DAYS
    }

    pub fn is_high_value(&self) -> bool {
        self.value() >= HIGH_VALUE_THRESHOLD
    }

    pub fn accepts_applications(&self, now: DateTime<Utc>) -> bool {
        self.status == TenderStatus::Open && self.deadline >= now
    }

    fn matches_search(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.category, &self.clinic_name]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

string_enum! {
    /// Status facet of the marketplace listing.
    pub enum TenderStatusFilter {
        All => "all",
        Open => "open",
        Closed => "closed",
        ClosingSoon => "closing_soon",
        HighValue => "high_value",
    }
}

string_enum! {
    pub enum TenderSort {
        Deadline => "deadline",
        Value => "value",
        Created => "created",
        Urgency => "urgency",
    }
}

/// Marketplace query. `None` and `"all"` both disable a facet.
#[derive(Debug, Clone, Default)]
pub struct TenderFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub status: Option<TenderStatusFilter>,
    pub sort: Option<TenderSort>,
}

fn facet(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

impl TenderFilter {
    pub fn matches(&self, tender: &Tender, now: DateTime<Utc>) -> bool {
        if let Some(needle) = facet(&self.search) {
            if !tender.matches_search(&needle.to_lowercase()) {
                return false;
            }
        }
        if facet(&self.category).is_some_and(|c| tender.category != c) {
            return false;
        }
        if facet(&self.region).is_some_and(|r| tender.location != r) {
            return false;
        }
        match self.status.unwrap_or(TenderStatusFilter::All) {
            TenderStatusFilter::All => true,
            TenderStatusFilter::Open => tender.status == TenderStatus::Open,
            TenderStatusFilter::Closed => tender.status == TenderStatus::Closed,
            TenderStatusFilter::ClosingSoon => tender.is_closing_soon(now),
            TenderStatusFilter::HighValue => tender.is_high_value(),
        }
    }

    /// Filters then sorts. The sort is stable, so ties keep listing order.
    pub fn apply(&self, tenders: Vec<Tender>, now: DateTime<Utc>) -> Vec<Tender> {
        let mut hits: Vec<Tender> = tenders
            .into_iter()
            .filter(|t| self.matches(t, now))
            .collect();
        let sort = self.sort.unwrap_or(TenderSort::Deadline);
        hits.sort_by(|a, b| compare(sort, a, b));
        hits
    }
}

fn compare(sort: TenderSort, a: &Tender, b: &Tender) -> Ordering {
    match sort {
        TenderSort::Deadline => a.deadline.cmp(&b.deadline),
        TenderSort::Value => b.value().total_cmp(&a.value()),
        TenderSort::Created => b.created_at.cmp(&a.created_at),
        TenderSort::Urgency => b.urgency.rank().cmp(&a.urgency.rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap()
    }

    fn tender(id: &str, days_left: i64, budget: f64, urgency: Urgency) -> Tender {
        Tender {
            id: id.to_string(),
            clinic_id: Some("clinic-1".into()),
            title: format!("Tender {id}"),
            description: "Cardiac monitoring systems".into(),
            category: "Medical Equipment".into(),
            requirements: vec!["CE Marking".into()],
            budget: Some(budget),
            estimated_value: None,
            deadline: now() + Duration::days(days_left),
            status: TenderStatus::Open,
            applicants: vec![],
            created_at: now() - Duration::days(days_left),
            clinic_name: "Algiers Medical Center".into(),
            urgency,
            location: "Algiers".into(),
            contact_person: None,
            submission_deadline: None,
            evaluation_criteria: vec![],
        }
    }

    fn ids(tenders: &[Tender]) -> Vec<&str> {
        tenders.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn default_sort_is_earliest_deadline_first() {
        let list = vec![
            tender("a", 20, 1.0, Urgency::Low),
            tender("b", 3, 1.0, Urgency::Low),
            tender("c", 10, 1.0, Urgency::Low),
        ];
        let sorted = TenderFilter::default().apply(list, now());
        assert_eq!(ids(&sorted), vec!["b", "c", "a"]);
    }

    #[test]
    fn urgency_and_value_sorts() {
        let list = vec![
            tender("low", 5, 250_000.0, Urgency::Low),
            tender("high", 5, 10_000.0, Urgency::High),
            tender("mid", 5, 750_000.0, Urgency::Medium),
        ];
        let by_urgency = TenderFilter {
            sort: Some(TenderSort::Urgency),
            ..Default::default()
        }
        .apply(list.clone(), now());
        assert_eq!(ids(&by_urgency), vec!["high", "mid", "low"]);

        let by_value = TenderFilter {
            sort: Some(TenderSort::Value),
            ..Default::default()
        }
        .apply(list, now());
        assert_eq!(ids(&by_value), vec!["mid", "low", "high"]);
    }

    #[test]
    fn closing_soon_and_high_value_facets() {
        let list = vec![
            tender("soon-cheap", 2, 5_000.0, Urgency::Medium),
            tender("late-rich", 30, 500_000.0, Urgency::Medium),
        ];
        let soon = TenderFilter {
            status: Some(TenderStatusFilter::ClosingSoon),
            ..Default::default()
        }
        .apply(list.clone(), now());
        assert_eq!(ids(&soon), vec!["soon-cheap"]);

        let rich = TenderFilter {
            status: Some(TenderStatusFilter::HighValue),
            ..Default::default()
        }
        .apply(list, now());
        assert_eq!(ids(&rich), vec!["late-rich"]);
    }

    #[test]
    fn search_is_case_insensitive_and_all_means_no_filter() {
        let mut other = tender("x", 5, 1.0, Urgency::Low);
        other.title = "Laboratory testing".into();
        other.description = "Blood work".into();
        other.category = "Laboratory Services".into();
        other.clinic_name = "Oran Regional Hospital".into();
        other.location = "Oran".into();
        let list = vec![tender("a", 5, 1.0, Urgency::Low), other];

        let filter = TenderFilter {
            search: Some("ORAN".into()),
            category: Some("all".into()),
            region: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(list.clone(), now())), vec!["x"]);

        let by_region = TenderFilter {
            region: Some("Algiers".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_region.apply(list, now())), vec!["a"]);
    }

    #[test]
    fn deadline_rounding_and_application_window() {
        let mut t = tender("a", 0, 1.0, Urgency::Low);
        t.deadline = now() + Duration::hours(1);
        assert_eq!(t.days_until_deadline(now()), 1);
        assert!(t.accepts_applications(now()));

        t.deadline = now() - Duration::hours(1);
        assert!(!t.accepts_applications(now()));

        t.deadline = now() + Duration::days(3);
        t.status = TenderStatus::Closed;
        assert!(!t.accepts_applications(now()));
    }

    #[test]
    fn value_falls_back_to_estimate() {
        let mut t = tender("a", 5, 1.0, Urgency::Low);
        t.budget = None;
        t.estimated_value = Some(120_000.0);
        assert!(t.is_high_value());
        t.estimated_value = None;
        assert_eq!(t.value(), 0.0);
    }
}
