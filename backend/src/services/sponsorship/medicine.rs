use actix_web::{web, HttpResponse};
use common::model::compliance::LogLevel;
use common::model::sponsorship::{Medicine, PaymentStatus};
use common::model::user::Role;
use common::requests::{AdminMedicineSponsorshipUpdate, MedicineSponsorshipRequest};
use rusqlite::{params, Connection};
use serde_json::json;

use crate::audit;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::medicines;
use crate::state::AppState;

pub(crate) async fn request(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<MedicineSponsorshipRequest>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let conn = state.db.connect()?;
    let mut medicine = medicines::find(&conn, &req.medicine_id)?
        .ok_or_else(|| ApiError::not_found("Medicine not found"))?;
    if user.role != Role::Pharmacy || medicine.pharmacy_id != user.user_id {
        return Err(ApiError::forbidden("Only pharmacy owner can sponsor"));
    }
    if let (Some(start), Some(end)) = (req.start, req.end) {
        if end <= start {
            return Err(ApiError::bad_request("end must be after start"));
        }
    }

    medicine.sponsored = false;
    medicine.sponsored_start = req.start;
    medicine.sponsored_end = req.end;
    medicine.payment_status = PaymentStatus::Pending;
    medicine.priority = req.priority.unwrap_or(0);
    save_sponsorship(&conn, &medicine)?;
    Ok(HttpResponse::Ok().json(medicine))
}

pub(crate) async fn admin_update(
    user: AuthUser,
    state: web::Data<AppState>,
    medicine_id: web::Path<String>,
    payload: web::Json<AdminMedicineSponsorshipUpdate>,
) -> ApiResult<HttpResponse> {
    if !user.is_admin() {
        return Err(ApiError::forbidden("Admin only"));
    }
    let conn = state.db.connect()?;
    let mut medicine = medicines::find(&conn, &medicine_id)?
        .ok_or_else(|| ApiError::not_found("Medicine not found"))?;

    if let Some(sponsored) = payload.sponsored {
        medicine.sponsored = sponsored;
    }
    if let Some(status) = payload.payment_status {
        medicine.payment_status = status;
    }
    if let Some(priority) = payload.priority {
        medicine.priority = priority;
    }
    save_sponsorship(&conn, &medicine)?;
    audit::record(
        &conn,
        LogLevel::Info,
        "Medicine sponsorship updated",
        json!({ "admin": user.user_id, "medicineId": medicine.id }),
    )?;
    Ok(HttpResponse::Ok().json(medicine))
}

fn save_sponsorship(conn: &Connection, medicine: &Medicine) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE medicines SET sponsored = ?1, sponsored_start = ?2, sponsored_end = ?3, \
         payment_status = ?4, priority = ?5 WHERE id = ?6",
        params![
            medicine.sponsored,
            medicine.sponsored_start,
            medicine.sponsored_end,
            medicine.payment_status.as_str(),
            medicine.priority,
            medicine.id,
        ],
    )?;
    Ok(())
}
