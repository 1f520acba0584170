//! Reporting for paying accounts.
//!
//! Every route needs a Trial, Pro or Enterprise plan (admins bypass) and
//! returns JSON, or `text/csv` when called with `format=csv`. Time series
//! are grouped with [`Period::bucket`](common::model::analytics::Period)
//! and come back in ascending key order.

use actix_web::web::{get, scope};
use actix_web::{HttpResponse, Scope};
use common::model::analytics::Period;
use common::model::user::PlanType;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};

mod appointments;
mod inventory;
mod usage;

const API_PATH: &str = "/api/analytics";

const REPORT_PLANS: &[PlanType] = &[PlanType::Trial, PlanType::Pro, PlanType::Enterprise];

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/appointments/doctor", get().to(appointments::by_doctor))
        .route("/appointments/clinic", get().to(appointments::by_clinic))
        .route("/appointments/status", get().to(appointments::by_status))
        .route("/inventory/consumption", get().to(inventory::consumption))
        .route("/inventory/low-stock", get().to(inventory::low_stock))
        .route("/usage", get().to(usage::process))
}

/// Query parameters shared by the analytics routes; each route reads the
/// ones it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsQuery {
    doctor_id: Option<String>,
    clinic_id: Option<String>,
    pharmacy_id: Option<String>,
    medicine_id: Option<String>,
    period: Option<String>,
    threshold: Option<i64>,
    format: Option<String>,
}

impl AnalyticsQuery {
    /// Anything other than a known period groups by day.
    fn period(&self) -> Period {
        self.period
            .as_deref()
            .and_then(|p| p.trim().to_lowercase().parse().ok())
            .unwrap_or_default()
    }

    fn wants_csv(&self) -> bool {
        self.format.as_deref().is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }
}

fn require_report_plan(user: &AuthUser, conn: &Connection) -> ApiResult<()> {
    user.require_plan(conn, REPORT_PLANS)
}

fn respond<T: Serialize>(rows: &[T], query: &AnalyticsQuery) -> ApiResult<HttpResponse> {
    if !query.wants_csv() {
        return Ok(HttpResponse::Ok().json(rows));
    }
    let body = to_csv(rows)?;
    Ok(HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(body))
}

fn to_csv<T: Serialize>(rows: &[T]) -> ApiResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ApiError::Internal(format!("csv export failed: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("csv export failed: {e}")))
}
