//! In-app notifications.
//!
//! Other services create them through [`notify_booking`] and
//! [`notify_subscription_expiry`]; users read them through
//! `GET /api/notifications` (newest first) and acknowledge them with
//! `POST /api/notifications/read`.

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use chrono::{DateTime, Utc};
use common::model::appointment::Appointment;
use common::model::notification::{Notification, NotificationKind};
use common::model::user::PlanType;
use rusqlite::{params, Connection, Row};
use serde_json::{json, Value};

use crate::db::{enum_column, json_column, new_id, to_json};

mod list;
mod mark_read;

const API_PATH: &str = "/api/notifications";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/read", post().to(mark_read::process))
}

pub(crate) fn notify(
    conn: &Connection,
    user_id: &str,
    kind: NotificationKind,
    message: String,
    meta: Value,
) -> rusqlite::Result<Notification> {
    let notification = Notification {
        id: new_id(),
        user_id: user_id.to_string(),
        kind,
        message,
        read: false,
        created_at: Utc::now(),
        meta,
    };
    conn.execute(
        "INSERT INTO notifications (id, user_id, kind, message, read, created_at, meta) \
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
        params![
            notification.id,
            notification.user_id,
            notification.kind.as_str(),
            notification.message,
            notification.created_at,
            to_json(&notification.meta)?
        ],
    )?;
    Ok(notification)
}

/// Confirms a booking to the patient who made it.
pub(crate) fn notify_booking(conn: &Connection, appointment: &Appointment) -> rusqlite::Result<Notification> {
    notify(
        conn,
        &appointment.patient_id,
        NotificationKind::Booking,
        format!(
            "Your appointment with Dr. {} is booked for {} at {}.",
            appointment.doctor_id, appointment.date, appointment.time
        ),
        json!({
            "appointmentId": appointment.appointment_id,
            "doctorId": appointment.doctor_id,
            "date": appointment.date,
        }),
    )
}

pub(crate) fn notify_subscription_expiry(
    conn: &Connection,
    user_id: &str,
    plan: PlanType,
    expires_at: Option<DateTime<Utc>>,
) -> rusqlite::Result<Notification> {
    let message = match expires_at {
        Some(date) => format!(
            "Your {plan} subscription will expire on {}. Please renew to keep your access.",
            date.format("%Y-%m-%d")
        ),
        None => format!("Your {plan} plan is active with no expiry date"),
    };
    notify(
        conn,
        user_id,
        NotificationKind::Subscription,
        message,
        json!({ "planType": plan, "planExpiresAt": expires_at }),
    )
}

pub(crate) fn map_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: enum_column(row, 2)?,
        message: row.get(3)?,
        read: row.get(4)?,
        created_at: row.get(5)?,
        meta: json_column(row, 6)?,
    })
}

pub(crate) const COLUMNS: &str = "id, user_id, kind, message, read, created_at, meta";
