use actix_web::{web, HttpResponse};
use common::model::compliance::{LogEntry, LogLevel};
use rusqlite::{params, Connection, Row};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::{enum_column, json_column};
use crate::error::{ApiError, ApiResult};
use crate::services::non_blank;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LogQuery {
    level: Option<String>,
    search: Option<String>,
    limit: Option<u32>,
    skip: Option<u32>,
}

struct LogFilter {
    level: Option<LogLevel>,
    search: Option<String>,
    limit: u32,
    skip: u32,
}

impl TryFrom<LogQuery> for LogFilter {
    type Error = ApiError;

    fn try_from(query: LogQuery) -> ApiResult<Self> {
        let level = non_blank(query.level)
            .map(|l| l.to_lowercase().parse::<LogLevel>())
            .transpose()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok(Self {
            level,
            search: non_blank(query.search),
            limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
            skip: query.skip.unwrap_or(0),
        })
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        message: row.get(1)?,
        level: enum_column(row, 2)?,
        timestamp: row.get(3)?,
        meta: json_column(row, 4)?,
    })
}

fn query(conn: &Connection, filter: &LogFilter) -> rusqlite::Result<Vec<LogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, message, level, timestamp, meta FROM logs \
         WHERE (?1 IS NULL OR level = ?1) \
           AND (?2 IS NULL OR instr(lower(message), lower(?2)) > 0) \
         ORDER BY timestamp DESC, rowid DESC LIMIT ?3 OFFSET ?4",
    )?;
    let rows = stmt.query_map(
        params![
            filter.level.map(|l| l.as_str()),
            filter.search,
            filter.limit,
            filter.skip
        ],
        map_row,
    )?;
    rows.collect()
}

/// Admin log, newest first.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    params: web::Query<LogQuery>,
) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let filter = LogFilter::try_from(params.into_inner())?;
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(query(&conn, &filter)?))
}
