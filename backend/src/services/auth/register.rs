//! # Registration
//!
//! Backs `POST /api/auth/register`.
//!
//! ## Workflow
//!
//! 1. `userId`, `name`, `email`, `password` and `role` must all be present.
//! 2. E-mail format and password strength use the same rules as the
//!    registration wizard in `common::validation`.
//! 3. Doctors and hospitals must attach a certificate; it is written to
//!    `certificate_dir` before the account row exists.
//! 4. A clinic asking for `subscriptionPlan = "trial"` starts on the Trial
//!    plan for `trial_days`.
//! 5. The account is inserted, an audit entry is written and a token is
//!    issued so the client is signed in right away.
//!
//! Admin accounts can only be self-registered while no admin exists, which
//! is how a fresh deployment gets its first administrator.

use actix_web::{web, HttpResponse};
use chrono::{Duration, Utc};
use common::model::compliance::LogLevel;
use common::model::user::{PlanType, Role, User};
use common::requests::{AuthResponse, RegisterRequest};
use common::validation::{is_strong_password, is_valid_email, PASSWORD_RULE};
use rusqlite::Connection;
use serde_json::json;

use super::certificate;
use crate::audit;
use crate::db::{is_constraint_violation, users};
use crate::error::{ApiError, ApiResult};
use crate::services::{non_blank, run_blocking};
use crate::state::AppState;

pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let state = state.into_inner();
    let response = run_blocking(move || register_user(&state, payload.into_inner())).await?;
    Ok(HttpResponse::Created().json(response))
}

pub fn register_user(state: &AppState, req: RegisterRequest) -> ApiResult<AuthResponse> {
    let (Some(user_id), Some(name), Some(email), Some(password), Some(role)) = (
        non_blank(req.user_id),
        non_blank(req.name),
        non_blank(req.email),
        req.password.filter(|p| !p.is_empty()),
        non_blank(req.role),
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    if !is_strong_password(&password) {
        return Err(ApiError::bad_request(PASSWORD_RULE));
    }
    let role: Role = role
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid role: {role}")))?;
    if role.requires_certificate() && req.certificate.is_none() {
        return Err(ApiError::bad_request(
            "Certificate is required for doctors and hospitals",
        ));
    }

    let conn = state.db.connect()?;
    if role == Role::Admin && admin_exists(&conn)? {
        return Err(ApiError::forbidden("Admin accounts are created by an administrator"));
    }
    if users::id_or_email_taken(&conn, &user_id, &email)? {
        return Err(ApiError::conflict("User already exists"));
    }

    let certificate = req
        .certificate
        .as_ref()
        .map(|upload| certificate::store(&state.settings.certificate_dir, upload))
        .transpose()?;

    let now = Utc::now();
    let wants_trial = req
        .subscription_plan
        .as_deref()
        .is_some_and(|plan| plan.eq_ignore_ascii_case("trial"));
    let trial = role == Role::Clinic && wants_trial;

    let user = User {
        user_id,
        name,
        email,
        role,
        clinic_id: None,
        certificate,
        first_name: None,
        last_name: None,
        phone: None,
        date_of_birth: None,
        gender: None,
        health_info: None,
        plan_type: trial.then_some(PlanType::Trial),
        plan_activated_at: trial.then_some(now),
        plan_expires_at: trial
            .then(|| now + Duration::days(i64::from(state.settings.trial_days))),
        created_at: now,
    };

    let password_hash = state.passwords.hash(&password);
    users::insert(&conn, &user, &password_hash).map_err(|e| {
        if is_constraint_violation(&e) {
            ApiError::conflict("User already exists")
        } else {
            ApiError::from(e)
        }
    })?;
    audit::record(
        &conn,
        LogLevel::Info,
        "User registered",
        json!({ "userId": user.user_id, "role": user.role }),
    )?;

    let token = state.tokens.issue(&user)?;
    Ok(AuthResponse {
        message: Some("User registered".to_string()),
        token,
        user,
    })
}

fn admin_exists(conn: &Connection) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')",
        [],
        |row| row.get(0),
    )
}
