use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Expired => "expired",
    }
}

/// Paid placement request for a clinic. Only counts once an admin has set
/// it featured and paid, and until `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredClinic {
    pub clinic_id: String,
    pub featured: bool,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub priority: i64,
}

impl SponsoredClinic {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.featured
            && self.payment_status == PaymentStatus::Paid
            && self.end.is_some_and(|end| end >= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub pharmacy_id: String,
    pub sponsored: bool,
    pub sponsored_start: Option<DateTime<Utc>>,
    pub sponsored_end: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub priority: i64,
}

string_enum! {
    pub enum InventoryAction {
        Consumed => "consumed",
        Restocked => "restocked",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLog {
    pub id: String,
    pub medicine_id: String,
    pub pharmacy_id: String,
    pub action: InventoryAction,
    pub quantity: i64,
    pub date: DateTime<Utc>,
}
