use actix_web::{web, HttpResponse};
use common::requests::ScanRequest;

use super::pipeline::{self, ScanInput};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{decode_base64_payload, run_blocking};
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ScanRequest>,
) -> ApiResult<HttpResponse> {
    let input = decode_request(user.user_id, payload.into_inner())?;
    let result = run_blocking(move || pipeline::run(&state, input, |_| {})).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub(super) fn decode_request(user_id: String, req: ScanRequest) -> ApiResult<ScanInput> {
    if req.image.trim().is_empty() {
        return Err(ApiError::bad_request("No image provided"));
    }
    let input = ScanInput {
        user_id,
        bytes: decode_base64_payload(&req.image)?,
        location: req.location,
        scan_type: req.scan_type.unwrap_or_default(),
    };
    input.check()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use crate::services::scan::fixtures::png_base64;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::model::document::{ScanResult, ScanType};
    use common::model::user::Role;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn scan_store_and_read_back() {
        let ctx = TestContext::new();
        let amina = ctx.create_user("amina", Role::Patient);
        let karim = ctx.create_user("karim", Role::Patient);
        let admin = ctx.create_user("root", Role::Admin);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/scan/scan")
            .insert_header(bearer(&amina))
            .set_json(json!({
                "image": png_base64(7),
                "scanType": "receipt",
                "location": { "latitude": 36.75, "longitude": 3.05, "address": "Pharmacie centrale" },
            }))
            .to_request();
        let result: ScanResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.text, "Paracetamol 500mg");
        assert_eq!(result.confidence, 91.0);
        assert_eq!(result.document.scan_type, ScanType::Receipt);
        let doc_uri = format!("/api/scan/document/{}", result.document.id);

        let req = TestRequest::get()
            .uri("/api/scan/history")
            .insert_header(bearer(&amina))
            .to_request();
        let history: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["location"]["address"], "Pharmacie centrale");

        let req = TestRequest::get().uri(&doc_uri).insert_header(bearer(&karim)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = TestRequest::get().uri(&doc_uri).insert_header(bearer(&admin)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = TestRequest::delete().uri(&doc_uri).insert_header(bearer(&admin)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
        let req = TestRequest::delete().uri(&doc_uri).insert_header(bearer(&amina)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = TestRequest::get().uri(&doc_uri).insert_header(bearer(&amina)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn bad_payloads_are_400() {
        let ctx = TestContext::new();
        let token = ctx.create_user("amina", Role::Patient);
        let app = test_app!(ctx);

        for image in ["", "data:image/png;base64,", "@@not-base64@@", "aGVsbG8gd29ybGQ="] {
            let req = TestRequest::post()
                .uri("/api/scan/scan")
                .insert_header(bearer(&token))
                .set_json(json!({ "image": image }))
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::BAD_REQUEST,
                "{image}"
            );
        }

        let req = TestRequest::post()
            .uri("/api/scan/scan")
            .set_json(json!({ "image": png_base64(1) }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
