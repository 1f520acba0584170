use actix_web::{web, HttpResponse};
use common::model::compliance::LogLevel;
use common::requests::{AuthResponse, LoginRequest};
use serde_json::json;

use crate::audit;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::services::{non_blank, run_blocking};
use crate::state::AppState;

pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let state = state.into_inner();
    let response = run_blocking(move || authenticate(&state, payload.into_inner())).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Unknown accounts answer 404 and wrong passwords 401.
pub fn authenticate(state: &AppState, req: LoginRequest) -> ApiResult<AuthResponse> {
    let login = non_blank(req.user_id)
        .or_else(|| non_blank(req.email))
        .ok_or_else(|| ApiError::bad_request("userId or email is required"))?;

    let conn = state.db.connect()?;
    let record = users::find_for_login(&conn, &login)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !state.passwords.verify(&req.password, &record.password_hash) {
        audit::record(
            &conn,
            LogLevel::Warn,
            "Failed login",
            json!({ "userId": record.user.user_id }),
        )?;
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let user = record.user;
    audit::compliance(&conn, &user.user_id, "login", None, Some("success".to_string()))?;
    audit::record(
        &conn,
        LogLevel::Info,
        "User logged in",
        json!({ "userId": user.user_id, "role": user.role }),
    )?;

    let token = state.tokens.issue(&user)?;
    Ok(AuthResponse {
        message: None,
        token,
        user,
    })
}
