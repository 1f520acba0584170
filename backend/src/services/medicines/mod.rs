//! Pharmacy stock. Every stock change goes through `POST /{id}/inventory`,
//! which writes an [`InventoryLog`](common::model::sponsorship::InventoryLog)
//! in the same transaction so consumption analytics stay in step with stock.

use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::sponsorship::Medicine;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::enum_column;

mod create;
mod inventory;
mod list;

const API_PATH: &str = "/api/medicines";

pub(crate) const COLUMNS: &str =
    "id, name, stock, pharmacy_id, sponsored, sponsored_start, sponsored_end, payment_status, priority";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{id}/inventory", post().to(inventory::process))
}

pub(crate) fn map_row(row: &Row<'_>) -> rusqlite::Result<Medicine> {
    Ok(Medicine {
        id: row.get(0)?,
        name: row.get(1)?,
        stock: row.get(2)?,
        pharmacy_id: row.get(3)?,
        sponsored: row.get(4)?,
        sponsored_start: row.get(5)?,
        sponsored_end: row.get(6)?,
        payment_status: enum_column(row, 7)?,
        priority: row.get(8)?,
    })
}

pub(crate) fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Medicine>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM medicines WHERE id = ?1"),
        params![id],
        map_row,
    )
    .optional()
}

pub(crate) fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Medicine>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM medicines"))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}
