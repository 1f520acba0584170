use actix_web::{web, HttpResponse};

use super::find;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let clinic = find(&conn, &id)?.ok_or_else(|| ApiError::not_found("Clinic not found"))?;
    Ok(HttpResponse::Ok().json(clinic))
}
