use actix_web::{web, HttpResponse};

use crate::auth::AuthUser;
use crate::db::users;
use crate::error::ApiResult;
use crate::state::AppState;

/// Every account, without password hashes or health data.
pub(crate) async fn process(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(users::list(&conn)?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::model::user::{Role, User};

    #[actix_web::test]
    async fn admin_only() {
        let ctx = TestContext::new();
        let admin = ctx.create_user("root", Role::Admin);
        let patient = ctx.create_user("amina", Role::Patient);
        let app = test_app!(ctx);

        let req = TestRequest::get()
            .uri("/api/auth/users")
            .insert_header(bearer(&patient))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::get()
            .uri("/api/auth/users")
            .insert_header(bearer(&admin))
            .to_request();
        let users: Vec<User> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(users.len(), 2);

        let req = TestRequest::get().uri("/api/auth/users").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
