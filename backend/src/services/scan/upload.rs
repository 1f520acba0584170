use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::requests::ScanMetadata;
use futures_util::StreamExt;

use super::pipeline::{self, ScanInput};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::run_blocking;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart form with a `file` part and an optional `json` part holding
/// [`ScanMetadata`]. Parts may come in either order; others are skipped.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let input = read_form(user.user_id, payload).await?;
    let result = run_blocking(move || pipeline::run(&state, input, |_| {})).await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn read_form(user_id: String, mut payload: Multipart) -> ApiResult<ScanInput> {
    let mut file: Option<Vec<u8>> = None;
    let mut metadata = ScanMetadata::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::bad_request(format!("Malformed upload: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ApiError::bad_request(format!("Malformed upload: {e}")))?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ApiError::bad_request("File exceeds 10 MB"));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some("file") => file = Some(bytes),
            Some("json") => {
                metadata = serde_json::from_slice(&bytes)
                    .map_err(|e| ApiError::bad_request(format!("Invalid json part: {e}")))?;
            }
            _ => {}
        }
    }

    let input = ScanInput {
        user_id,
        bytes: file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?,
        location: metadata.location,
        scan_type: metadata.scan_type.unwrap_or_default(),
    };
    input.check()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use crate::services::scan::fixtures::png;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::model::document::{ScanResult, ScanType};
    use common::model::user::Role;

    const BOUNDARY: &str = "----healthland-test";

    fn form(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    #[actix_web::test]
    async fn multipart_scan_with_metadata() {
        let ctx = TestContext::new();
        let token = ctx.create_user("amina", Role::Patient);
        let app = test_app!(ctx);

        let image = png(3);
        let body = form(&[
            ("json", None, br#"{"scanType":"business_card"}"#),
            ("file", Some("card.png"), &image),
        ]);
        let req = TestRequest::post()
            .uri("/api/scan/upload")
            .insert_header(bearer(&token))
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(body)
            .to_request();
        let result: ScanResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.document.scan_type, ScanType::BusinessCard);
        assert_eq!(result.text, "Paracetamol 500mg");

        let body = form(&[("json", None, b"{}")]);
        let req = TestRequest::post()
            .uri("/api/scan/upload")
            .insert_header(bearer(&token))
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
