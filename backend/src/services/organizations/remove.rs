use actix_web::{web, HttpResponse};
use common::model::compliance::LogLevel;
use serde_json::json;

use crate::audit;
use crate::auth::AuthUser;
use crate::db::{organizations, write_transaction};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Answers with the organization as it was before deletion.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let mut conn = state.db.connect()?;
    let tx = write_transaction(&mut conn)?;
    let org = organizations::find(&tx, &id)?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;
    organizations::delete(&tx, &org.id)?;
    audit::record(
        &tx,
        LogLevel::Warn,
        "Organization deleted",
        json!({ "orgId": org.id, "by": user.user_id }),
    )?;
    tx.commit()?;
    Ok(HttpResponse::Ok().json(org))
}
