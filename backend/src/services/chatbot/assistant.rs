use actix_web::{web, HttpResponse};
use common::model::chat::AssistantRole;
use common::requests::AssistantRequest;
use serde_json::json;

use super::checked_message;
use super::keywords::assistant_reply;
use crate::error::ApiResult;

/// Canned answers for the in-app helper, picked by the audience the client
/// says it serves.
pub(crate) async fn process(payload: web::Json<AssistantRequest>) -> ApiResult<HttpResponse> {
    let message = checked_message(&payload.message)?;
    let role = payload
        .role
        .as_deref()
        .and_then(|r| r.trim().to_lowercase().parse().ok())
        .unwrap_or(AssistantRole::Patient);
    Ok(HttpResponse::Ok().json(json!({ "response": assistant_reply(role, message) })))
}
