//! Health assistant chat.
//!
//! Every route accepts anonymous callers; conversations are keyed by user id
//! when a valid token is sent and by peer address otherwise. When an LLM is
//! configured it writes the answers, and the keyword rules in [`keywords`]
//! take over whenever it is missing or fails. Emergency detection never
//! depends on the model.

use actix_web::web::{delete, get, post, scope};
use actix_web::{HttpRequest, Scope};
use common::model::chat::{ChatRole, ChatTurn};
use log::warn;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::llm::LlmClient;

mod assistant;
pub mod history;
mod keywords;
mod message;
mod smart;
mod status;

const API_PATH: &str = "/api/chatbot";

const MAX_MESSAGE_CHARS: usize = 1000;

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/message", post().to(message::process))
        .route("/smart-message", post().to(smart::process))
        .route("/assistant", post().to(assistant::process))
        .route("/status", get().to(status::process))
        .route("/history", get().to(history::list))
        .route("/history", delete().to(history::clear))
}

fn caller_id(user: Option<&AuthUser>, req: &HttpRequest) -> String {
    match user {
        Some(user) => user.user_id.clone(),
        None => req
            .peer_addr()
            .map_or_else(|| "anonymous".to_string(), |addr| addr.ip().to_string()),
    }
}

fn checked_message(raw: &str) -> ApiResult<&str> {
    let message = raw.trim();
    if message.is_empty() || message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::bad_request(format!(
            "Message is required and must be between 1 and {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(message)
}

/// One-shot question to the model. `None` when no model is configured or
/// the call fails, so callers fall back to keywords.
async fn ask(llm: Option<&LlmClient>, system: &str, question: &str) -> Option<String> {
    let llm = llm?;
    let turns = [
        ChatTurn::new(ChatRole::System, system),
        ChatTurn::new(ChatRole::User, question),
    ];
    match llm.complete(&turns).await {
        Ok(answer) => Some(answer.trim().to_string()),
        Err(e) => {
            warn!("{} request failed: {e}", llm.model());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_trimmed_and_bounded() {
        assert_eq!(checked_message("  hi  ").unwrap(), "hi");
        assert!(checked_message("   ").is_err());
        assert!(checked_message(&"a".repeat(MAX_MESSAGE_CHARS)).is_ok());
        assert!(checked_message(&"a".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }
}
