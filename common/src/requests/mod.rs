//! JSON bodies accepted by the backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::appointment::AppointmentStatus;
use crate::model::clinic::{Coordinates, OpeningHours};
use crate::model::document::{ScanLocation, ScanType};
use crate::model::sponsorship::{InventoryAction, PaymentStatus};
use crate::model::tender::Urgency;
use crate::model::user::{HealthInfo, PlanType, User};

/// A certificate file sent inline with a registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateUpload {
    pub file_name: String,
    pub content_base64: String,
}

/// Fields are optional on the wire so that missing ones produce the
/// "All fields are required" error rather than a deserialisation failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub certificate: Option<CertificateUpload>,
    /// `"trial"` asks for the free clinic trial.
    pub subscription_plan: Option<String>,
    /// Trial length in days.
    pub subscription_duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// ISO-8601 calendar date, `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub health_info: Option<HealthInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    pub clinic_id: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    /// Kept as text so an unknown plan answers "Invalid plan type".
    pub plan_type: String,
    #[serde(default)]
    pub plan_expires_at: Option<DateTime<Utc>>,
}

impl UpdatePlanRequest {
    pub fn purchasable_plan(&self) -> Option<PlanType> {
        self.plan_type
            .parse::<PlanType>()
            .ok()
            .filter(|plan| PlanType::PURCHASABLE.contains(plan))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyClinicsRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateClinicRequest {
    pub name: String,
    pub address: String,
    pub specialties: Vec<String>,
    pub services: Vec<String>,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub administrator_name: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub accepted_insurance: Vec<String>,
    pub operating_hours: std::collections::BTreeMap<String, OpeningHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub clinic_name: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub submission_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub evaluation_criteria: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSponsorshipRequest {
    pub clinic_id: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminClinicSponsorshipUpdate {
    pub featured: Option<bool>,
    pub payment_status: Option<PaymentStatus>,
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSponsorshipRequest {
    pub medicine_id: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminMedicineSponsorshipUpdate {
    pub sponsored: Option<bool>,
    pub payment_status: Option<PaymentStatus>,
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMedicineRequest {
    pub name: String,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRequest {
    pub action: InventoryAction,
    pub quantity: i64,
}

/// Base64 image, optionally prefixed by a `data:image/...;base64,` header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanRequest {
    pub image: String,
    pub location: Option<ScanLocation>,
    pub scan_type: Option<ScanType>,
}

/// Metadata part of a multipart scan upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanMetadata {
    pub location: Option<ScanLocation>,
    pub scan_type: Option<ScanType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantRequest {
    pub message: String,
    /// Unknown or missing roles are answered as a patient.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceScanRequest {
    pub device_info: Option<String>,
    pub result: Option<String>,
}

/// Body of both `POST` and `PUT /api/orgs`. On update, absent fields keep
/// their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationRequest {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub domain: Option<String>,
    pub primary_color: Option<String>,
    pub license_type: Option<String>,
    pub license_expiry: Option<DateTime<Utc>>,
    pub branding: Option<Map<String, Value>>,
}
