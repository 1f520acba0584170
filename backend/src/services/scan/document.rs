use actix_web::{web, HttpResponse};
use rusqlite::params;
use serde_json::json;

use super::find;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Other users' documents answer 404 so their ids do not leak.
pub(crate) async fn get(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let document = find(&conn, &id)?
        .filter(|doc| user.is_self_or_admin(&doc.user_id))
        .ok_or_else(|| ApiError::not_found("Document not found"))?;
    Ok(HttpResponse::Ok().json(document))
}

pub(crate) async fn remove(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let deleted = conn.execute(
        "DELETE FROM scan_documents WHERE id = ?1 AND user_id = ?2",
        params![id.as_str(), user.user_id],
    )?;
    if deleted == 0 {
        return Err(ApiError::not_found("Document not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Document deleted" })))
}
