use actix_web::{web, HttpResponse};

use crate::db::organizations;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let org = organizations::find(&conn, &id)?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;
    Ok(HttpResponse::Ok().json(org))
}
