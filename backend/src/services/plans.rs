//! Paid plans.
//!
//! Users read and change their own plan under `/api/plans/me`; admins can
//! set anyone's plan with `PUT /api/plans/{userId}`. Only Basic, Pro and
//! Enterprise can be bought, Trial is granted at clinic sign-up. Every
//! change stamps `planActivatedAt` and notifies the user of the expiry.

use actix_web::web::{get, put, scope};
use actix_web::{web, HttpResponse, Scope};
use chrono::Utc;
use common::model::compliance::LogLevel;
use common::model::user::PlanInfo;
use common::requests::UpdatePlanRequest;
use rusqlite::Connection;
use serde_json::json;

use crate::audit;
use crate::auth::AuthUser;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::services::notifications::notify_subscription_expiry;
use crate::state::AppState;

const API_PATH: &str = "/api/plans";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/me", get().to(get_own))
        .route("/me", put().to(update_own))
        .route("/{user_id}", put().to(update_any))
}

async fn get_own(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let record = users::find(&conn, &user.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(record.user.plan()))
}

async fn update_own(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdatePlanRequest>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let plan = set_plan(&conn, &user.user_id, &payload)?;
    Ok(HttpResponse::Ok().json(plan))
}

async fn update_any(
    user: AuthUser,
    state: web::Data<AppState>,
    target: web::Path<String>,
    payload: web::Json<UpdatePlanRequest>,
) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let conn = state.db.connect()?;
    let plan = set_plan(&conn, &target, &payload)?;
    audit::record(
        &conn,
        LogLevel::Info,
        "Admin changed plan",
        json!({ "admin": user.user_id, "userId": target.as_str(), "planType": plan.plan_type }),
    )?;
    Ok(HttpResponse::Ok().json(plan))
}

fn set_plan(conn: &Connection, user_id: &str, req: &UpdatePlanRequest) -> ApiResult<PlanInfo> {
    let plan = req
        .purchasable_plan()
        .ok_or_else(|| ApiError::bad_request("Invalid plan type"))?;
    let now = Utc::now();
    if req.plan_expires_at.is_some_and(|end| end <= now) {
        return Err(ApiError::bad_request("planExpiresAt must be in the future"));
    }

    if users::update_plan(conn, user_id, plan, now, req.plan_expires_at)? == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    notify_subscription_expiry(conn, user_id, plan, req.plan_expires_at)?;
    Ok(PlanInfo {
        plan_type: Some(plan),
        plan_activated_at: Some(now),
        plan_expires_at: req.plan_expires_at,
    })
}
