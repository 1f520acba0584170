use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use common::model::chat::{ChatReply, ChatRole, ChatTurn};
use common::requests::ChatMessageRequest;
use log::{info, warn};
use serde_json::json;

use super::keywords::{emergency_reply, fallback_reply, is_emergency};
use super::{caller_id, checked_message};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

const SYSTEM_PROMPT: &str = "You are the HealthLand health assistant for patients in Algeria. \
    Give short, general health information and explain medical terms in plain language. \
    Never diagnose or prescribe. Recommend seeing a healthcare professional for anything \
    specific, and tell the user to call 14 (SAMU) in an emergency.";

pub(crate) async fn process(
    user: Option<AuthUser>,
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<ChatMessageRequest>,
) -> ApiResult<HttpResponse> {
    let message = checked_message(&payload.message)?;
    let caller = caller_id(user.as_ref(), &req);

    let is_emergency = is_emergency(message);
    let answer = if is_emergency {
        info!("emergency keywords in chat message from {caller}");
        emergency_reply()
    } else {
        generate(&state, &caller, message).await
    };
    state.chats.record(&caller, message, &answer).await;

    let reply = ChatReply {
        message: answer,
        is_emergency,
        timestamp: Utc::now(),
    };
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": reply })))
}

async fn generate(state: &AppState, caller: &str, message: &str) -> String {
    let Some(llm) = state.llm.as_ref() else {
        return fallback_reply(message);
    };
    let mut turns = vec![ChatTurn::new(ChatRole::System, SYSTEM_PROMPT)];
    turns.extend(state.chats.history(caller).await);
    turns.push(ChatTurn::new(ChatRole::User, message));

    match llm.complete(&turns).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!("{} request failed, answering from keywords: {e}", llm.model());
            fallback_reply(message)
        }
    }
}
