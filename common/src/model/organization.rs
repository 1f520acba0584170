use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A white-label customer: its branding and the licence that lets its
/// members use the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub logo: Option<String>,
    pub domain: Option<String>,
    pub primary_color: Option<String>,
    pub license_type: Option<String>,
    pub license_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub branding: Map<String, Value>,
}

impl Organization {
    /// Without an expiry date the licence never lapses.
    pub fn license_expired(&self, now: DateTime<Utc>) -> bool {
        self.license_expiry.is_some_and(|expiry| expiry < now)
    }
}
