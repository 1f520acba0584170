use actix_web::{web, HttpResponse};
use common::model::notification::Notification;
use rusqlite::{params, Connection};

use super::{map_row, COLUMNS};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn process(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(list_for_user(&conn, &user.user_id)?))
}

pub(crate) fn list_for_user(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Notification>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], map_row)?;
    rows.collect()
}
