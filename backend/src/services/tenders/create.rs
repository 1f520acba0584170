use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::compliance::LogLevel;
use common::model::tender::{Tender, TenderStatus};
use common::requests::CreateTenderRequest;
use serde_json::json;

use super::insert;
use crate::audit;
use crate::auth::AuthUser;
use crate::db::{new_id, users};
use crate::error::{ApiError, ApiResult};
use crate::services::non_blank;
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateTenderRequest>,
) -> ApiResult<HttpResponse> {
    if !user.role.is_care_provider() && !user.is_admin() {
        return Err(ApiError::forbidden("Only clinics can publish tenders"));
    }
    let req = payload.into_inner();
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    let now = Utc::now();
    if req.deadline <= now {
        return Err(ApiError::bad_request("Deadline must be in the future"));
    }
    for amount in [req.budget, req.estimated_value].into_iter().flatten() {
        if amount < 0.0 {
            return Err(ApiError::bad_request("Amounts cannot be negative"));
        }
    }

    let conn = state.db.connect()?;
    let clinic_name = match non_blank(req.clinic_name) {
        Some(name) => name,
        None => users::find(&conn, &user.user_id)?
            .map(|record| record.user.name)
            .unwrap_or_default(),
    };
    let tender = Tender {
        id: new_id(),
        clinic_id: (!user.is_admin()).then(|| user.user_id.clone()),
        title: title.to_string(),
        description: req.description.trim().to_string(),
        category: req.category.trim().to_string(),
        requirements: req.requirements,
        budget: req.budget,
        estimated_value: req.estimated_value,
        deadline: req.deadline,
        status: TenderStatus::Open,
        applicants: Vec::new(),
        created_at: now,
        clinic_name,
        urgency: req.urgency,
        location: req.location.trim().to_string(),
        contact_person: non_blank(req.contact_person),
        submission_deadline: req.submission_deadline,
        evaluation_criteria: req.evaluation_criteria,
    };
    insert(&conn, &tender)?;
    audit::record(
        &conn,
        LogLevel::Info,
        "Tender published",
        json!({ "tenderId": tender.id, "by": user.user_id }),
    )?;
    Ok(HttpResponse::Created().json(tender))
}
