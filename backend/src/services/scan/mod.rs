//! Document scanning.
//!
//! # Workflow
//!
//! 1. The client sends an image either as base64 JSON (`POST /scan`) or as
//!    a multipart upload (`POST /upload`, a `file` part plus an optional
//!    `json` part carrying location and scan type).
//! 2. [`pipeline::run`] normalises the image to PNG, hands it to the
//!    configured [`OcrEngine`](crate::ocr::OcrEngine) and stores the result.
//!    Re-sending the same bytes returns the stored document.
//! 3. Large scans can go through `POST /jobs` instead; the client polls
//!    `GET /jobs/{job_id}` until it reports `Completed(<document id>)`.
//! 4. `GET /history` and `/document/{id}` read stored scans back.

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;
use common::model::document::{ScanDocument, ScanLocation};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::enum_column;

mod document;
mod history;
mod jobs;
mod pipeline;
mod submit;
mod upload;

const API_PATH: &str = "/api/scan";

const COLUMNS: &str = "id, user_id, image_md5, extracted_text, confidence, latitude, longitude, \
    address, scan_type, created_at, updated_at";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/scan", post().to(submit::process))
        .route("/upload", post().to(upload::process))
        .route("/jobs", post().to(jobs::start))
        .route("/jobs/{job_id}", get().to(jobs::status))
        .route("/history", get().to(history::process))
        .route("/document/{id}", get().to(document::get))
        .route("/document/{id}", delete().to(document::remove))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ScanDocument> {
    let latitude: Option<f64> = row.get(5)?;
    let longitude: Option<f64> = row.get(6)?;
    let address: Option<String> = row.get(7)?;
    Ok(ScanDocument {
        id: row.get(0)?,
        user_id: row.get(1)?,
        image_md5: row.get(2)?,
        extracted_text: row.get(3)?,
        confidence: row.get(4)?,
        location: latitude.zip(longitude).map(|(latitude, longitude)| ScanLocation {
            latitude,
            longitude,
            address,
        }),
        scan_type: enum_column(row, 8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<ScanDocument>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM scan_documents WHERE id = ?1"),
        params![id],
        map_row,
    )
    .optional()
}

fn find_by_hash(conn: &Connection, user_id: &str, image_md5: &str) -> rusqlite::Result<Option<ScanDocument>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM scan_documents WHERE user_id = ?1 AND image_md5 = ?2"),
        params![user_id, image_md5],
        map_row,
    )
    .optional()
}

fn insert(conn: &Connection, doc: &ScanDocument) -> rusqlite::Result<()> {
    let location = doc.location.as_ref();
    conn.execute(
        &format!(
            "INSERT INTO scan_documents ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            doc.id,
            doc.user_id,
            doc.image_md5,
            doc.extracted_text,
            doc.confidence,
            location.map(|l| l.latitude),
            location.map(|l| l.longitude),
            location.and_then(|l| l.address.clone()),
            doc.scan_type.as_str(),
            doc.created_at,
            doc.updated_at,
        ],
    )?;
    Ok(())
}
