//! Paid placement for clinics and medicines.
//!
//! Clinics and pharmacies file a request, which always lands as unfeatured
//! and `pending` payment; an admin then marks it paid and featured and sets
//! its priority. Search endpoints apply the rules in [`ranking`].

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;
use common::model::sponsorship::SponsoredClinic;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::enum_column;

mod clinic;
mod medicine;
pub mod ranking;
mod search;

const API_PATH: &str = "/api/sponsor";

const COLUMNS: &str = "clinic_id, featured, starts_at, ends_at, payment_status, priority";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/clinic", post().to(clinic::request))
        .route("/admin/clinic/{clinic_id}", put().to(clinic::admin_update))
        .route("/medicine", post().to(medicine::request))
        .route("/admin/medicine/{medicine_id}", put().to(medicine::admin_update))
        .route("/search/clinics", get().to(search::clinics))
        .route("/search/medicines", get().to(search::medicines))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<SponsoredClinic> {
    Ok(SponsoredClinic {
        clinic_id: row.get(0)?,
        featured: row.get(1)?,
        start: row.get(2)?,
        end: row.get(3)?,
        payment_status: enum_column(row, 4)?,
        priority: row.get(5)?,
    })
}

pub(crate) fn load_all(conn: &Connection) -> rusqlite::Result<Vec<SponsoredClinic>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM sponsored_clinics"))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

fn find(conn: &Connection, clinic_id: &str) -> rusqlite::Result<Option<SponsoredClinic>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM sponsored_clinics WHERE clinic_id = ?1"),
        params![clinic_id],
        map_row,
    )
    .optional()
}

fn save(conn: &Connection, sponsorship: &SponsoredClinic) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO sponsored_clinics (clinic_id, featured, starts_at, ends_at, payment_status, priority) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT(clinic_id) DO UPDATE SET featured = excluded.featured, \
         starts_at = excluded.starts_at, ends_at = excluded.ends_at, \
         payment_status = excluded.payment_status, priority = excluded.priority",
        params![
            sponsorship.clinic_id,
            sponsorship.featured,
            sponsorship.start,
            sponsorship.end,
            sponsorship.payment_status.as_str(),
            sponsorship.priority,
        ],
    )?;
    Ok(())
}
