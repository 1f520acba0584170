//! HTTP surface. Each area builds its own `Scope` under `/api/<area>` and
//! `configure` mounts them all, together with the extractor settings every
//! route shares.

use actix_web::web;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ApiError, ApiResult};

pub mod analytics;
pub mod appointments;
pub mod auth;
pub mod chatbot;
pub mod clinics;
pub mod compliance;
pub mod logs;
pub mod medicines;
pub mod notifications;
pub mod organizations;
pub mod plans;
pub mod profile;
pub mod scan;
pub mod sponsorship;
pub mod tenders;

/// Base64 scan images are sent inline, so bodies may be large.
const JSON_LIMIT: usize = 10 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into()),
    )
    .service(auth::configure_routes())
    .service(profile::configure_routes())
    .service(appointments::configure_routes())
    .service(notifications::configure_routes())
    .service(plans::configure_routes())
    .service(clinics::configure_routes())
    .service(tenders::configure_routes())
    .service(sponsorship::configure_routes())
    .service(medicines::configure_routes())
    .service(analytics::configure_routes())
    .service(scan::configure_routes())
    .service(chatbot::configure_routes())
    .service(compliance::configure_routes())
    .service(logs::configure_routes())
    .service(organizations::configure_routes());
}

/// Runs synchronous work (SQLite, hashing, OCR) off the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}

/// Decodes base64 content, tolerating a `data:<mime>;base64,` prefix and
/// embedded line breaks.
pub(crate) fn decode_base64_payload(raw: &str) -> ApiResult<Vec<u8>> {
    let body = match raw.split_once(',') {
        Some((header, body)) if header.starts_with("data:") => body,
        _ => raw,
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(ApiError::bad_request("Empty file content"));
    }
    STANDARD
        .decode(compact)
        .map_err(|_| ApiError::bad_request("Invalid base64 content"))
}

/// Treats blank strings like missing ones.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
