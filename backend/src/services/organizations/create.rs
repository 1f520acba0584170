use actix_web::{web, HttpResponse};
use common::model::compliance::LogLevel;
use common::model::organization::Organization;
use common::requests::OrganizationRequest;
use serde_json::json;

use crate::audit;
use crate::auth::AuthUser;
use crate::db::{new_id, organizations};
use crate::error::{ApiError, ApiResult};
use crate::services::non_blank;
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<OrganizationRequest>,
) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let req = payload.into_inner();
    let name = non_blank(req.name).ok_or_else(|| ApiError::bad_request("Name is required"))?;
    let org = Organization {
        id: new_id(),
        name,
        logo: non_blank(req.logo),
        domain: non_blank(req.domain),
        primary_color: non_blank(req.primary_color),
        license_type: non_blank(req.license_type),
        license_expiry: req.license_expiry,
        branding: req.branding.unwrap_or_default(),
    };

    let conn = state.db.connect()?;
    organizations::insert(&conn, &org)?;
    audit::record(
        &conn,
        LogLevel::Info,
        "Organization created",
        json!({ "orgId": org.id, "by": user.user_id }),
    )?;
    Ok(HttpResponse::Created().json(org))
}
