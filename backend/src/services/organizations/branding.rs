use actix_web::HttpResponse;
use serde_json::json;

use crate::auth::License;

pub(crate) async fn process(license: License) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "orgId": license.org_id,
        "orgName": license.org_name,
        "branding": license.branding,
    }))
}

#[cfg(test)]
mod tests {
    use crate::auth::license::ORG_HEADER;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::{Duration, Utc};
    use common::model::organization::Organization;
    use common::model::user::Role;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn branding_follows_the_licence() {
        let ctx = TestContext::new();
        let admin = ctx.create_user("root", Role::Admin);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/orgs")
            .insert_header(bearer(&admin))
            .set_json(json!({
                "name": "Clinique Hydra Group",
                "licenseExpiry": Utc::now() + Duration::days(90),
                "branding": { "logoText": "Hydra" },
            }))
            .to_request();
        let org: Organization = test::call_and_read_body_json(&app, req).await;

        let req = TestRequest::get().uri("/api/orgs/branding").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::get()
            .uri("/api/orgs/branding")
            .insert_header((ORG_HEADER, org.id.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["orgName"], "Clinique Hydra Group");
        assert_eq!(body["branding"]["logoText"], "Hydra");

        let req = TestRequest::put()
            .uri(&format!("/api/orgs/{}", org.id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "licenseExpiry": Utc::now() - Duration::days(1) }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = TestRequest::get()
            .uri("/api/orgs/branding")
            .insert_header((ORG_HEADER, org.id.as_str()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }
}
