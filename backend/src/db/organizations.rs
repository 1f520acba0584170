//! Organization rows. Used by the `/api/orgs` service and the licence guard.

use common::model::organization::Organization;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{json_column, to_json};

const COLUMNS: &str =
    "id, name, logo, domain, primary_color, license_type, license_expiry, branding";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get(0)?,
        name: row.get(1)?,
        logo: row.get(2)?,
        domain: row.get(3)?,
        primary_color: row.get(4)?,
        license_type: row.get(5)?,
        license_expiry: row.get(6)?,
        branding: json_column(row, 7)?,
    })
}

pub fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Organization>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM organizations WHERE id = ?1"),
        params![id],
        map_row,
    )
    .optional()
}

pub fn list_all(conn: &Connection) -> rusqlite::Result<Vec<Organization>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM organizations ORDER BY name"))?;
    let rows = stmt.query_map([], map_row)?;
    rows.collect()
}

pub fn insert(conn: &Connection, org: &Organization) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO organizations ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            org.id,
            org.name,
            org.logo,
            org.domain,
            org.primary_color,
            org.license_type,
            org.license_expiry,
            to_json(&org.branding)?,
        ],
    )?;
    Ok(())
}

/// Returns the number of rows changed, 0 for an unknown id.
pub fn update(conn: &Connection, org: &Organization) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE organizations SET name = ?2, logo = ?3, domain = ?4, primary_color = ?5, \
         license_type = ?6, license_expiry = ?7, branding = ?8 WHERE id = ?1",
        params![
            org.id,
            org.name,
            org.logo,
            org.domain,
            org.primary_color,
            org.license_type,
            org.license_expiry,
            to_json(&org.branding)?,
        ],
    )
}

pub fn delete(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM organizations WHERE id = ?1", params![id])
}
