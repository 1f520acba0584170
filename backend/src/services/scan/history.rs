use actix_web::{web, HttpResponse};
use common::model::document::ScanDocument;
use rusqlite::params;

use super::{map_row, COLUMNS};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn process(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM scan_documents WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
    ))?;
    let documents = stmt
        .query_map(params![user.user_id], map_row)?
        .collect::<rusqlite::Result<Vec<ScanDocument>>>()?;
    Ok(HttpResponse::Ok().json(documents))
}
