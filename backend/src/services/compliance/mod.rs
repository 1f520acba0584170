//! Device security scans and the per-user compliance trail.

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::compliance::ComplianceLog;
use rusqlite::{params, Connection, Row};

mod history;
mod scan;

const API_PATH: &str = "/api/compliance";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/scan", post().to(scan::process))
        .route("/history", get().to(history::process))
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ComplianceLog> {
    Ok(ComplianceLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        action: row.get(2)?,
        device_info: row.get(3)?,
        result: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

fn list_for_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<ComplianceLog>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, action, device_info, result, timestamp FROM compliance_logs \
         WHERE user_id = ?1 ORDER BY timestamp DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    rows.collect()
}
