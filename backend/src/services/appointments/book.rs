use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::appointment::{Appointment, AppointmentStatus};
use common::requests::BookAppointmentRequest;
use rusqlite::{params, Connection};
use serde_json::json;

use crate::auth::AuthUser;
use crate::db::new_id;
use crate::error::{ApiError, ApiResult};
use crate::services::notifications::notify_booking;
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<BookAppointmentRequest>,
) -> ApiResult<HttpResponse> {
    let mut conn = state.db.connect()?;
    let appointment = book(&mut conn, &user.user_id, payload.into_inner())?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Appointment booked",
        "appointment": appointment,
    })))
}

fn book(conn: &mut Connection, patient_id: &str, req: BookAppointmentRequest) -> ApiResult<Appointment> {
    let doctor_id = req.doctor_id.trim();
    let clinic_id = req.clinic_id.trim();
    let time = req.time.trim();
    if doctor_id.is_empty() || clinic_id.is_empty() || time.is_empty() {
        return Err(ApiError::bad_request("doctorId, clinicId, date and time are required"));
    }
    if req.date < Utc::now().date_naive() {
        return Err(ApiError::bad_request("Appointment date cannot be in the past"));
    }

    let appointment = Appointment {
        appointment_id: new_id(),
        patient_id: patient_id.to_string(),
        doctor_id: doctor_id.to_string(),
        clinic_id: clinic_id.to_string(),
        date: req.date,
        time: time.to_string(),
        status: AppointmentStatus::Pending,
        notes: req.notes.filter(|n| !n.trim().is_empty()),
        created_at: Utc::now(),
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO appointments (appointment_id, patient_id, doctor_id, clinic_id, date, time, \
         status, notes, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appointment.appointment_id,
            appointment.patient_id,
            appointment.doctor_id,
            appointment.clinic_id,
            appointment.date,
            appointment.time,
            appointment.status.as_str(),
            appointment.notes,
            appointment.created_at,
        ],
    )?;
    notify_booking(&tx, &appointment)?;
    tx.commit()?;
    Ok(appointment)
}
