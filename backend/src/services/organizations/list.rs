use actix_web::{web, HttpResponse};

use crate::db::organizations;
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn process(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(organizations::list_all(&conn)?))
}
