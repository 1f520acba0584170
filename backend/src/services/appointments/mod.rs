//! Patient bookings.
//!
//! - `POST /api/appointments`: the caller books as patient; new bookings
//!   start `pending` and the patient gets a booking notification.
//! - `GET /api/appointments/user/{userId}`: bookings where the user is
//!   patient or doctor, by date.
//! - `PUT /api/appointments/{id}/status`: moves a booking along
//!   pending -> confirmed -> completed, or cancels it.

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;
use common::model::appointment::Appointment;
use rusqlite::Row;

use crate::db::enum_column;

mod book;
mod list;
mod update_status;

const API_PATH: &str = "/api/appointments";

pub(crate) const COLUMNS: &str =
    "appointment_id, patient_id, doctor_id, clinic_id, date, time, status, notes, created_at";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(book::process))
        .route("/user/{user_id}", get().to(list::process))
        .route("/{appointment_id}/status", put().to(update_status::process))
}

pub(crate) fn map_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        appointment_id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        clinic_id: row.get(3)?,
        date: row.get(4)?,
        time: row.get(5)?,
        status: enum_column(row, 6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}
