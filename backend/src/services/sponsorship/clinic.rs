use actix_web::{web, HttpResponse};
use common::model::compliance::LogLevel;
use common::model::sponsorship::{PaymentStatus, SponsoredClinic};
use common::model::user::Role;
use common::requests::{AdminClinicSponsorshipUpdate, ClinicSponsorshipRequest};
use serde_json::json;

use super::{find, save};
use crate::audit;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::clinics;
use crate::state::AppState;

/// A clinic account may sponsor itself, either by its user id or by a
/// clinic profile it owns.
pub(crate) async fn request(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ClinicSponsorshipRequest>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let conn = state.db.connect()?;
    if user.role != Role::Clinic || !clinics::is_managed_by(&conn, &req.clinic_id, &user.user_id)? {
        return Err(ApiError::forbidden("Only clinics can request sponsorship"));
    }
    if let (Some(start), Some(end)) = (req.start, req.end) {
        if end <= start {
            return Err(ApiError::bad_request("end must be after start"));
        }
    }

    let sponsorship = SponsoredClinic {
        clinic_id: req.clinic_id,
        featured: false,
        start: req.start,
        end: req.end,
        payment_status: PaymentStatus::Pending,
        priority: req.priority.unwrap_or(0),
    };
    save(&conn, &sponsorship)?;
    Ok(HttpResponse::Ok().json(sponsorship))
}

pub(crate) async fn admin_update(
    user: AuthUser,
    state: web::Data<AppState>,
    clinic_id: web::Path<String>,
    payload: web::Json<AdminClinicSponsorshipUpdate>,
) -> ApiResult<HttpResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Admin only"));
    }
    let conn = state.db.connect()?;
    let mut sponsorship = find(&conn, &clinic_id)?.ok_or_else(|| ApiError::not_found("Not found"))?;

    if let Some(featured) = payload.featured {
        sponsorship.featured = featured;
    }
    if let Some(status) = payload.payment_status {
        sponsorship.payment_status = status;
    }
    if let Some(priority) = payload.priority {
        sponsorship.priority = priority;
    }
    save(&conn, &sponsorship)?;
    audit::record(
        &conn,
        LogLevel::Info,
        "Clinic sponsorship updated",
        json!({ "admin": user.user_id, "clinicId": sponsorship.clinic_id }),
    )?;
    Ok(HttpResponse::Ok().json(sponsorship))
}
