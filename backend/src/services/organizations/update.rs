use actix_web::{web, HttpResponse};
use common::requests::OrganizationRequest;

use crate::auth::AuthUser;
use crate::db::organizations;
use crate::error::{ApiError, ApiResult};
use crate::services::non_blank;
use crate::state::AppState;

/// Only the fields present in the body change.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<OrganizationRequest>,
) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let req = payload.into_inner();
    let conn = state.db.connect()?;
    let mut org = organizations::find(&conn, &id)?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;

    if let Some(name) = req.name {
        org.name = non_blank(Some(name)).ok_or_else(|| ApiError::bad_request("Name cannot be empty"))?;
    }
    if req.logo.is_some() {
        org.logo = non_blank(req.logo);
    }
    if req.domain.is_some() {
        org.domain = non_blank(req.domain);
    }
    if req.primary_color.is_some() {
        org.primary_color = non_blank(req.primary_color);
    }
    if req.license_type.is_some() {
        org.license_type = non_blank(req.license_type);
    }
    if req.license_expiry.is_some() {
        org.license_expiry = req.license_expiry;
    }
    if let Some(branding) = req.branding {
        org.branding = branding;
    }

    if organizations::update(&conn, &org)? == 0 {
        return Err(ApiError::not_found("Organization not found"));
    }
    Ok(HttpResponse::Ok().json(org))
}
