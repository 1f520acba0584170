//! Persistent trails: the admin log (`logs` table, served by `/api/logs`)
//! and per-user compliance entries (`/api/compliance`).

use chrono::Utc;
use common::model::compliance::{ComplianceLog, LogLevel};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection};
use serde_json::Value;

use crate::db::{new_id, to_json};

/// Writes an admin log entry and mirrors it to the process log.
pub fn record(conn: &Connection, level: LogLevel, message: &str, meta: Value) -> rusqlite::Result<()> {
    match level {
        LogLevel::Debug => debug!("{message} {meta}"),
        LogLevel::Info => info!("{message} {meta}"),
        LogLevel::Warn => warn!("{message} {meta}"),
        LogLevel::Error => error!("{message} {meta}"),
    }
    conn.execute(
        "INSERT INTO logs (id, message, level, timestamp, meta) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new_id(), message, level.as_str(), Utc::now(), to_json(&meta)?],
    )?;
    Ok(())
}

pub fn compliance(
    conn: &Connection,
    user_id: &str,
    action: &str,
    device_info: Option<String>,
    result: Option<String>,
) -> rusqlite::Result<ComplianceLog> {
    let entry = ComplianceLog {
        id: new_id(),
        user_id: user_id.to_string(),
        action: action.to_string(),
        device_info,
        result,
        timestamp: Utc::now(),
    };
    conn.execute(
        "INSERT INTO compliance_logs (id, user_id, action, device_info, result, timestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.id,
            entry.user_id,
            entry.action,
            entry.device_info,
            entry.result,
            entry.timestamp
        ],
    )?;
    Ok(entry)
}
