use actix_web::{web, HttpResponse};
use rusqlite::params;

use super::{map_row, COLUMNS};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = user_id.into_inner();
    if !user.is_self_or_admin(&user_id) {
        return Err(ApiError::forbidden("Access denied"));
    }

    let conn = state.db.connect()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE patient_id = ?1 OR doctor_id = ?1 \
         ORDER BY date, time"
    ))?;
    let appointments = stmt
        .query_map(params![user_id], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(HttpResponse::Ok().json(appointments))
}
