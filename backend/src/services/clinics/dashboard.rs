use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use common::model::clinic::{Clinic, ClinicDashboard};
use rusqlite::{params, Connection};

use super::{find, is_managed_by};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Only the managing account and admins see a clinic's figures.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let clinic = find(&conn, &id)?.ok_or_else(|| ApiError::not_found("Clinic not found"))?;
    if !user.is_admin() && !is_managed_by(&conn, &clinic.id, &user.user_id)? {
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(HttpResponse::Ok().json(aggregate(&conn, &clinic)?))
}

fn aggregate(conn: &Connection, clinic: &Clinic) -> rusqlite::Result<ClinicDashboard> {
    let (appointments, patients): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT patient_id) FROM appointments WHERE clinic_id = ?1",
        params![clinic.id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM appointments WHERE clinic_id = ?1 GROUP BY status",
    )?;
    let by_status = stmt
        .query_map(params![clinic.id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?
        .collect::<rusqlite::Result<BTreeMap<String, u64>>>()?;

    Ok(ClinicDashboard {
        appointments: appointments as u64,
        patients: patients as u64,
        by_status,
        rating: clinic.rating,
        reviews: clinic.review_count,
    })
}
