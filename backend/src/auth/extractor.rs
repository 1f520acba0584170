use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use common::model::user::{PlanType, Role};
use rusqlite::Connection;

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Caller identity taken from the `Authorization: Bearer <jwt>` header.
///
/// A missing header answers 401 and a bad or expired token 403. Handlers
/// that also serve anonymous callers take `Option<AuthUser>` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
    pub plan_type: Option<PlanType>,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> ApiResult<AuthUser> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state is not registered".to_string()))?;
    let token = bearer_token(req)
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::forbidden("Invalid token"))?;
    Ok(AuthUser {
        user_id: claims.user_id,
        role: claims.role,
        plan_type: claims.plan_type,
    })
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }

    pub fn require_role(&self, roles: &[Role]) -> ApiResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden("Access denied"))
        }
    }

    pub fn is_self_or_admin(&self, user_id: &str) -> bool {
        self.user_id == user_id || self.is_admin()
    }

    /// Reads the plan from the database rather than the token, so upgrades
    /// and expiries apply without logging in again. Admins always pass.
    pub fn require_plan(&self, conn: &Connection, plans: &[PlanType]) -> ApiResult<()> {
        if self.is_admin() {
            return Ok(());
        }
        let plan = users::find(conn, &self.user_id)?.map(|record| record.user.plan());
        let allowed = plan.is_some_and(|plan| {
            plan.is_active(Utc::now())
                && plan.plan_type.is_some_and(|current| plans.contains(&current))
        });
        if allowed {
            Ok(())
        } else {
            let names: Vec<&str> = plans.iter().map(PlanType::as_str).collect();
            Err(ApiError::forbidden(format!("Requires {} plan", names.join(" or "))))
        }
    }
}
