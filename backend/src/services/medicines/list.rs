use actix_web::{web, HttpResponse};
use common::model::sponsorship::Medicine;
use rusqlite::params;

use super::COLUMNS;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// The caller's own catalogue, by name. Admins see every pharmacy's.
pub(crate) async fn process(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM medicines WHERE ?1 OR pharmacy_id = ?2 ORDER BY name"
    ))?;
    let medicines = stmt
        .query_map(params![user.is_admin(), user.user_id], super::map_row)?
        .collect::<rusqlite::Result<Vec<Medicine>>>()?;
    Ok(HttpResponse::Ok().json(medicines))
}
