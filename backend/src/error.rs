//! Error type shared by every handler.
//!
//! Responses keep the `{ "message": ..., "error": ... }` body the web client
//! already parses. `error` only appears when there is a cause worth showing.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Missing credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Bad token, wrong role or plan.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A third-party engine (OCR, LLM) failed.
    #[error("{message}")]
    Upstream { message: String, detail: String },

    #[error("database error")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn upstream(message: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Upstream {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("serialization error: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Database(err) => {
                error!("database error: {err}");
                ErrorBody {
                    message: "Internal server error",
                    error: None,
                }
            }
            ApiError::Internal(detail) => {
                error!("internal error: {detail}");
                ErrorBody {
                    message: "Internal server error",
                    error: None,
                }
            }
            ApiError::Upstream { message, detail } => {
                error!("{message}: {detail}");
                ErrorBody {
                    message,
                    error: Some(detail),
                }
            }
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => ErrorBody {
                message,
                error: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn body_carries_message_and_optional_error() {
        let response = ApiError::upstream("OCR failed", "tesseract exited with 1").error_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "OCR failed");
        assert_eq!(body["error"], "tesseract exited with 1");
    }

    #[actix_web::test]
    async fn database_errors_are_not_leaked() {
        let response =
            ApiError::from(rusqlite::Error::InvalidQuery).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("error").is_none());
    }
}
