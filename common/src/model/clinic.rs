use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub open: String,
    pub close: String,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub address: String,
    pub specialties: Vec<String>,
    pub services: Vec<String>,
    pub rating: f64,
    pub review_count: u32,
    /// City or wilaya the clinic is listed under.
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub administrator_name: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub accepted_insurance: Vec<String>,
    /// Keyed by lower-case weekday name.
    pub operating_hours: BTreeMap<String, OpeningHours>,
    pub is_verified: bool,
    pub trial_ends_at: Option<DateTime<Utc>>,
}

/// One row of a clinic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSearchHit {
    #[serde(flatten)]
    pub clinic: Clinic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub sponsored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicDashboard {
    pub appointments: u64,
    pub patients: u64,
    pub by_status: BTreeMap<String, u64>,
    pub rating: f64,
    pub reviews: u32,
}
