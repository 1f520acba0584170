use actix_web::{web, HttpResponse};
use common::model::clinic::Clinic;
use common::model::compliance::LogLevel;
use common::model::user::Role;
use common::requests::CreateClinicRequest;
use serde_json::json;

use super::insert;
use crate::audit;
use crate::auth::AuthUser;
use crate::db::new_id;
use crate::error::{ApiError, ApiResult};
use crate::services::non_blank;
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateClinicRequest>,
) -> ApiResult<HttpResponse> {
    user.require_role(&[Role::Clinic, Role::Hospital, Role::Admin])?;
    let req = payload.into_inner();
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Clinic name is required"));
    }
    if req.coordinates.is_some_and(|c| !c.is_valid()) {
        return Err(ApiError::bad_request("Coordinates are out of range"));
    }

    let clinic = Clinic {
        id: new_id(),
        owner_id: Some(user.user_id.clone()),
        name: name.to_string(),
        address: req.address.trim().to_string(),
        specialties: req.specialties,
        services: req.services,
        rating: 0.0,
        review_count: 0,
        location: req.location.trim().to_string(),
        coordinates: req.coordinates,
        administrator_name: non_blank(req.administrator_name),
        phone: non_blank(req.phone),
        license_number: non_blank(req.license_number),
        accepted_insurance: req.accepted_insurance,
        operating_hours: req.operating_hours,
        is_verified: false,
        trial_ends_at: None,
    };

    let conn = state.db.connect()?;
    insert(&conn, &clinic)?;
    audit::record(
        &conn,
        LogLevel::Info,
        "Clinic created",
        json!({ "clinicId": clinic.id, "owner": user.user_id }),
    )?;
    Ok(HttpResponse::Created().json(clinic))
}
