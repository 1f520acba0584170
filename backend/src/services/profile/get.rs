use actix_web::{web, HttpResponse};
use common::model::user::{HealthInfo, User};

use crate::auth::AuthUser;
use crate::crypto::FieldCipher;
use crate::db::users::{self, UserRecord};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let record = users::find(&conn, &user.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(with_health_info(record, &state.cipher)?))
}

/// The owner's view of an account, health data decrypted.
pub(super) fn with_health_info(record: UserRecord, cipher: &FieldCipher) -> ApiResult<User> {
    let health_info = record
        .health_cipher
        .as_deref()
        .map(|stored| cipher.decrypt_json::<HealthInfo>(stored))
        .transpose()?;
    Ok(User {
        health_info,
        ..record.user
    })
}
