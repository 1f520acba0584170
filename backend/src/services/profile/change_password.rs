use actix_web::{web, HttpResponse};
use common::model::compliance::LogLevel;
use common::requests::ChangePasswordRequest;
use common::validation::{is_strong_password, PASSWORD_RULE};
use serde_json::json;

use crate::audit;
use crate::auth::AuthUser;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::services::run_blocking;
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let state = state.into_inner();
    run_blocking(move || change_password(&state, &user.user_id, payload.into_inner())).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password updated" })))
}

/// New passwords follow the registration strength rule.
fn change_password(state: &AppState, user_id: &str, req: ChangePasswordRequest) -> ApiResult<()> {
    let conn = state.db.connect()?;
    let record = users::find(&conn, user_id)?.ok_or_else(|| ApiError::not_found("User not found"))?;

    if !state.passwords.verify(&req.current_password, &record.password_hash) {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }
    if !is_strong_password(&req.new_password) {
        return Err(ApiError::bad_request(PASSWORD_RULE));
    }

    users::update_password(&conn, user_id, &state.passwords.hash(&req.new_password))?;
    audit::record(&conn, LogLevel::Info, "Password changed", json!({ "userId": user_id }))?;
    Ok(())
}
