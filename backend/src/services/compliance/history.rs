use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::list_for_user;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryQuery {
    user_id: Option<String>,
}

/// Own entries, newest first. Admins may read another user's trail.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let target = match query.into_inner().user_id {
        Some(id) if id != user.user_id => {
            if !user.is_admin() {
                return Err(ApiError::forbidden("Admin only"));
            }
            id
        }
        _ => user.user_id,
    };
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(list_for_user(&conn, &target)?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::model::compliance::ComplianceLog;
    use common::model::user::Role;
    use serde_json::json;

    #[actix_web::test]
    async fn scans_are_listed_per_user() {
        let ctx = TestContext::new();
        let clinic = ctx.create_user("elazhar", Role::Clinic);
        let other = ctx.create_user("karim", Role::Patient);
        let admin = ctx.create_user("root", Role::Admin);
        let app = test_app!(ctx);

        for result in ["clean", "2 outdated packages"] {
            let req = TestRequest::post()
                .uri("/api/compliance/scan")
                .insert_header(bearer(&clinic))
                .set_json(json!({ "deviceInfo": "reception-pc", "result": result }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let entry: ComplianceLog = test::read_body_json(resp).await;
            assert_eq!(entry.action, "device_scan");
            assert_eq!(entry.user_id, "elazhar");
        }

        let req = TestRequest::get()
            .uri("/api/compliance/history")
            .insert_header(bearer(&clinic))
            .to_request();
        let own: Vec<ComplianceLog> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(own.len(), 2);
        assert_eq!(own[0].result.as_deref(), Some("2 outdated packages"));

        let req = TestRequest::get()
            .uri("/api/compliance/history?userId=elazhar")
            .insert_header(bearer(&other))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::get()
            .uri("/api/compliance/history?userId=elazhar")
            .insert_header(bearer(&admin))
            .to_request();
        let seen: Vec<ComplianceLog> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(seen, own);
    }
}
