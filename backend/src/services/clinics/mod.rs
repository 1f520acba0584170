//! Clinic directory.
//!
//! # Workflow
//!
//! 1. Clinic accounts publish a profile with `POST /api/clinics`.
//! 2. Patients list clinics with `GET /api/clinics`. Without coordinates the
//!    listing puts active sponsors first and then sorts by rating; with
//!    `lat`/`lng` it keeps clinics inside the search radius, nearest first.
//! 3. `POST /api/clinics/nearby-clinics` answers the "near me" button, and
//!    `POST /api/clinics/request-location` tells the client to ask for a
//!    location when it has none.

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::clinic::{Clinic, Coordinates};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{json_column, to_json};

mod create;
mod dashboard;
mod geo;
mod get;
mod search;

const API_PATH: &str = "/api/clinics";

const COLUMNS: &str = "id, owner_id, name, address, specialties, services, rating, review_count, \
    location, latitude, longitude, administrator_name, phone, license_number, accepted_insurance, \
    operating_hours, is_verified, trial_ends_at";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(search::process))
        .route("", post().to(create::process))
        .route("/nearby-clinics", post().to(search::nearby))
        .route("/request-location", post().to(search::request_location))
        .route("/{id}", get().to(get::process))
        .route("/{id}/dashboard", get().to(dashboard::process))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Clinic> {
    let latitude: Option<f64> = row.get(9)?;
    let longitude: Option<f64> = row.get(10)?;
    Ok(Clinic {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        specialties: json_column(row, 4)?,
        services: json_column(row, 5)?,
        rating: row.get(6)?,
        review_count: row.get(7)?,
        location: row.get(8)?,
        coordinates: latitude
            .zip(longitude)
            .map(|(latitude, longitude)| Coordinates { latitude, longitude }),
        administrator_name: row.get(11)?,
        phone: row.get(12)?,
        license_number: row.get(13)?,
        accepted_insurance: json_column(row, 14)?,
        operating_hours: json_column(row, 15)?,
        is_verified: row.get(16)?,
        trial_ends_at: row.get(17)?,
    })
}

pub(crate) fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Clinic>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM clinics WHERE id = ?1"),
        params![id],
        map_row,
    )
    .optional()
}

pub(crate) fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Clinic>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM clinics"))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub(crate) fn insert(conn: &Connection, clinic: &Clinic) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO clinics ({COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            clinic.id,
            clinic.owner_id,
            clinic.name,
            clinic.address,
            to_json(&clinic.specialties)?,
            to_json(&clinic.services)?,
            clinic.rating,
            clinic.review_count,
            clinic.location,
            clinic.coordinates.map(|c| c.latitude),
            clinic.coordinates.map(|c| c.longitude),
            clinic.administrator_name,
            clinic.phone,
            clinic.license_number,
            to_json(&clinic.accepted_insurance)?,
            to_json(&clinic.operating_hours)?,
            clinic.is_verified,
            clinic.trial_ends_at,
        ],
    )?;
    Ok(())
}

/// A clinic account manages the clinic carrying its own user id and any
/// clinic profile it created.
pub(crate) fn is_managed_by(conn: &Connection, clinic_id: &str, user_id: &str) -> rusqlite::Result<bool> {
    if clinic_id == user_id {
        return Ok(true);
    }
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM clinics WHERE id = ?1 AND owner_id = ?2)",
        params![clinic_id, user_id],
        |row| row.get(0),
    )
}
