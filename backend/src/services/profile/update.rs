use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, Utc};
use common::model::user::{Gender, User};
use common::requests::UpdateProfileRequest;
use common::validation::is_valid_phone;

use super::get::with_health_info;
use crate::auth::AuthUser;
use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let updated = update_profile(&state, &user.user_id, payload.into_inner())?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Only the fields present in the request change.
fn update_profile(state: &AppState, user_id: &str, req: UpdateProfileRequest) -> ApiResult<User> {
    let conn = state.db.connect()?;
    let record = users::find(&conn, user_id)?.ok_or_else(|| ApiError::not_found("User not found"))?;
    let mut user = record.user.clone();

    if let Some(first) = req.first_name {
        user.first_name = Some(required_name(first, "First name")?);
    }
    if let Some(last) = req.last_name {
        user.last_name = Some(required_name(last, "Last name")?);
    }
    if let Some(phone) = req.phone {
        let phone = phone.trim().to_string();
        if phone.is_empty() {
            user.phone = None;
        } else if is_valid_phone(&phone) {
            user.phone = Some(phone);
        } else {
            return Err(ApiError::bad_request("Invalid phone number"));
        }
    }
    if let Some(date) = req.date_of_birth {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ApiError::bad_request("dateOfBirth must be a YYYY-MM-DD date"))?;
        if date > Utc::now().date_naive() {
            return Err(ApiError::bad_request("dateOfBirth cannot be in the future"));
        }
        user.date_of_birth = Some(date);
    }
    if let Some(gender) = req.gender {
        let gender: Gender = gender
            .parse()
            .map_err(|_| ApiError::bad_request("gender must be male, female or other"))?;
        user.gender = Some(gender);
    }

    let health_cipher = match &req.health_info {
        Some(info) => Some(state.cipher.encrypt_json(info)?),
        None => record.health_cipher.clone(),
    };

    users::update_profile(&conn, &user, health_cipher.as_deref())?;
    with_health_info(
        users::UserRecord {
            user,
            password_hash: record.password_hash,
            health_cipher,
        },
        &state.cipher,
    )
}

fn required_name(value: String, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::bad_request(format!("{field} cannot be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}
