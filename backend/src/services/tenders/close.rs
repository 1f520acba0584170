use actix_web::{web, HttpResponse};
use common::model::tender::TenderStatus;
use rusqlite::params;

use super::find;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let mut tender = find(&conn, &id)?.ok_or_else(|| ApiError::not_found("Tender not found"))?;
    let is_publisher = tender.clinic_id.as_deref() == Some(user.user_id.as_str());
    if !is_publisher && !user.is_admin() {
        return Err(ApiError::forbidden("Only the publishing clinic can close this tender"));
    }
    tender.status = TenderStatus::Closed;
    conn.execute(
        "UPDATE tenders SET status = ?1 WHERE id = ?2",
        params![tender.status.as_str(), tender.id],
    )?;
    Ok(HttpResponse::Ok().json(tender))
}
