use actix_web::{web, HttpResponse};
use common::model::appointment::{Appointment, AppointmentStatus};
use common::requests::UpdateAppointmentStatusRequest;
use rusqlite::{params, Connection, OptionalExtension};

use super::{map_row, COLUMNS};
use crate::auth::AuthUser;
use crate::db::write_transaction;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Doctors and admins drive the whole lifecycle; patients may only cancel.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    appointment_id: web::Path<String>,
    payload: web::Json<UpdateAppointmentStatusRequest>,
) -> ApiResult<HttpResponse> {
    let mut conn = state.db.connect()?;
    let appointment = transition(&mut conn, &user, &appointment_id, payload.status)?;
    Ok(HttpResponse::Ok().json(appointment))
}

/// The guard and the write share one transaction, so two callers cannot
/// both move the same appointment out of one status.
fn transition(
    conn: &mut Connection,
    user: &AuthUser,
    appointment_id: &str,
    next: AppointmentStatus,
) -> ApiResult<Appointment> {
    let tx = write_transaction(conn)?;
    let mut appointment: Appointment = tx
        .query_row(
            &format!("SELECT {COLUMNS} FROM appointments WHERE appointment_id = ?1"),
            params![appointment_id],
            map_row,
        )
        .optional()?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;

    let is_doctor = appointment.doctor_id == user.user_id;
    let is_patient = appointment.patient_id == user.user_id;
    let allowed = user.is_admin() || is_doctor || (is_patient && next == AppointmentStatus::Cancelled);
    if !allowed {
        return Err(ApiError::forbidden("Access denied"));
    }
    if !appointment.status.can_transition_to(next) {
        return Err(ApiError::conflict(format!(
            "Cannot change appointment from {} to {}",
            appointment.status, next
        )));
    }

    tx.execute(
        "UPDATE appointments SET status = ?1 WHERE appointment_id = ?2",
        params![next.as_str(), appointment.appointment_id],
    )?;
    tx.commit()?;
    appointment.status = next;
    Ok(appointment)
}
