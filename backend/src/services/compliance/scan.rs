use actix_web::{web, HttpResponse};
use common::requests::ComplianceScanRequest;

use crate::audit;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::non_blank;
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ComplianceScanRequest>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    let conn = state.db.connect()?;
    let entry = audit::compliance(
        &conn,
        &user.user_id,
        "device_scan",
        non_blank(req.device_info),
        non_blank(req.result),
    )?;
    Ok(HttpResponse::Created().json(entry))
}
