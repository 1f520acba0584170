use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    /// Account type. Decides which guards a token passes.
    pub enum Role {
        Patient => "patient",
        Doctor => "doctor",
        Nurse => "nurse",
        Admin => "admin",
        Clinic => "clinic",
        Supplier => "supplier",
        Pharmacy => "pharmacy",
        Hospital => "hospital",
    }
}

impl Role {
    /// Doctors and hospitals must prove their licence at sign-up.
    pub fn requires_certificate(&self) -> bool {
        matches!(self, Role::Doctor | Role::Hospital)
    }

    /// Roles allowed to publish tenders and run a clinic profile.
    pub fn is_care_provider(&self) -> bool {
        matches!(self, Role::Clinic | Role::Hospital)
    }
}

string_enum! {
    pub enum PlanType {
        Trial => "Trial",
        Basic => "Basic",
        Pro => "Pro",
        Enterprise => "Enterprise",
    }
}

impl PlanType {
    /// Plans a user can buy; `Trial` is only granted at clinic sign-up.
    pub const PURCHASABLE: &'static [PlanType] =
        &[PlanType::Basic, PlanType::Pro, PlanType::Enterprise];
}

string_enum! {
    pub enum Gender {
        Male => "male",
        Female => "female",
        Other => "other",
    }
}

/// Sensitive medical details. Encrypted at rest, plain in API responses to
/// the owner only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthInfo {
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub clinic_id: Option<String>,
    pub certificate: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_info: Option<HealthInfo>,
    pub plan_type: Option<PlanType>,
    pub plan_activated_at: Option<DateTime<Utc>>,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn plan(&self) -> PlanInfo {
        PlanInfo {
            plan_type: self.plan_type,
            plan_activated_at: self.plan_activated_at,
            plan_expires_at: self.plan_expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub plan_type: Option<PlanType>,
    pub plan_activated_at: Option<DateTime<Utc>>,
    pub plan_expires_at: Option<DateTime<Utc>>,
}

impl PlanInfo {
    /// A plan without an expiry date never lapses.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.plan_type.is_some() && self.plan_expires_at.is_none_or(|end| end >= now)
    }
}
