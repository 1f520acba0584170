//! Procurement marketplace.
//!
//! - `GET /api/tenders`: public listing with search, facets and sort
//!   (see [`TenderFilter`](common::model::tender::TenderFilter)).
//! - `GET /api/tenders/{id}`: one tender.
//! - `POST /api/tenders`: clinics, hospitals and admins publish a tender.
//! - `POST /api/tenders/{id}/apply`: the calling supplier joins the
//!   applicants, once.
//! - `POST /api/tenders/{id}/close`: the publisher or an admin closes it.

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::tender::Tender;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{enum_column, json_column, to_json};

mod apply;
mod close;
mod create;
mod get;
mod list;

const API_PATH: &str = "/api/tenders";

const COLUMNS: &str = "id, clinic_id, title, description, category, requirements, budget, \
    estimated_value, deadline, status, applicants, created_at, clinic_name, urgency, location, \
    contact_person, submission_deadline, evaluation_criteria";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}/apply", post().to(apply::process))
        .route("/{id}/close", post().to(close::process))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Tender> {
    Ok(Tender {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        requirements: json_column(row, 5)?,
        budget: row.get(6)?,
        estimated_value: row.get(7)?,
        deadline: row.get(8)?,
        status: enum_column(row, 9)?,
        applicants: json_column(row, 10)?,
        created_at: row.get(11)?,
        clinic_name: row.get(12)?,
        urgency: enum_column(row, 13)?,
        location: row.get(14)?,
        contact_person: row.get(15)?,
        submission_deadline: row.get(16)?,
        evaluation_criteria: json_column(row, 17)?,
    })
}

fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Tender>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM tenders WHERE id = ?1"),
        params![id],
        map_row,
    )
    .optional()
}

fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Tender>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM tenders"))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

fn insert(conn: &Connection, tender: &Tender) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO tenders ({COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
        ),
        params![
            tender.id,
            tender.clinic_id,
            tender.title,
            tender.description,
            tender.category,
            to_json(&tender.requirements)?,
            tender.budget,
            tender.estimated_value,
            tender.deadline,
            tender.status.as_str(),
            to_json(&tender.applicants)?,
            tender.created_at,
            tender.clinic_name,
            tender.urgency.as_str(),
            tender.location,
            tender.contact_person,
            tender.submission_deadline,
            to_json(&tender.evaluation_criteria)?,
        ],
    )?;
    Ok(())
}
