use actix_web::{web, HttpResponse};
use common::requests::MarkReadRequest;
use rusqlite::params;
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Only the recipient can mark a notification; anything else is a 404.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<MarkReadRequest>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let changed = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1 AND user_id = ?2",
        params![payload.notification_id, user.user_id],
    )?;
    if changed == 0 {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Marked as read" })))
}

#[cfg(test)]
mod tests {
    use crate::services::notifications::{notify, notify_subscription_expiry};
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::model::notification::{Notification, NotificationKind};
    use common::model::user::{PlanType, Role};
    use serde_json::json;

    #[actix_web::test]
    async fn newest_first_and_only_own_can_be_marked() {
        let ctx = TestContext::new();
        let amina = ctx.create_user("amina", Role::Patient);
        let karim = ctx.create_user("karim", Role::Patient);
        let conn = ctx.state.db.connect().unwrap();
        let first = notify(&conn, "amina", NotificationKind::Tender, "first".into(), json!(null)).unwrap();
        notify_subscription_expiry(&conn, "amina", PlanType::Pro, None).unwrap();
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/notifications")
            .insert_header(bearer(&amina))
            .to_request();
        let list: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].kind, NotificationKind::Subscription);
        assert!(!list[1].read);

        let req = TestRequest::post()
            .uri("/api/notifications/read")
            .insert_header(bearer(&karim))
            .set_json(json!({ "notificationId": first.id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = TestRequest::post()
            .uri("/api/notifications/read")
            .insert_header(bearer(&amina))
            .set_json(json!({ "notificationId": first.id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri("/api/notifications")
            .insert_header(bearer(&amina))
            .to_request();
        let list: Vec<Notification> = test::call_and_read_body_json(&app, req).await;
        assert!(list.iter().find(|n| n.id == first.id).unwrap().read);
    }
}
