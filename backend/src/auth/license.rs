use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderName;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::db::organizations;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const ORG_HEADER: HeaderName = HeaderName::from_static("x-org-id");

/// The organization named by the `x-org-id` header, once its licence has
/// been checked.
///
/// A missing header answers 400, an unknown organization 404 and a lapsed
/// licence 403.
#[derive(Debug, Clone, PartialEq)]
pub struct License {
    pub org_id: String,
    pub org_name: String,
    pub branding: Map<String, Value>,
}

impl FromRequest for License {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(check_license(req))
    }
}

fn check_license(req: &HttpRequest) -> ApiResult<License> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state is not registered".to_string()))?;
    let org_id = req
        .headers()
        .get(ORG_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Organization ID required"))?;

    let conn = state.db.connect()?;
    let org = organizations::find(&conn, org_id)?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;
    if org.license_expired(Utc::now()) {
        return Err(ApiError::forbidden("License expired"));
    }
    Ok(License {
        org_id: org.id,
        org_name: org.name,
        branding: org.branding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestContext;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::ResponseError;
    use chrono::Duration;
    use common::model::organization::Organization;
    use serde_json::json;

    fn extract(ctx: &TestContext, org_id: Option<&str>) -> ApiResult<License> {
        let mut req = TestRequest::default().app_data(ctx.data());
        if let Some(id) = org_id {
            req = req.insert_header((ORG_HEADER, id));
        }
        check_license(&req.to_http_request())
    }

    fn seed(ctx: &TestContext, id: &str, days_left: i64) {
        let conn = ctx.state.db.connect().unwrap();
        let branding = json!({ "theme": "teal" }).as_object().unwrap().clone();
        organizations::insert(
            &conn,
            &Organization {
                id: id.into(),
                name: format!("Org {id}"),
                logo: None,
                domain: None,
                primary_color: Some("#008080".into()),
                license_type: Some("pro".into()),
                license_expiry: Some(Utc::now() + Duration::days(days_left)),
                branding,
            },
        )
        .unwrap();
    }

    #[actix_web::test]
    async fn header_lookup_and_expiry() {
        let ctx = TestContext::new();
        seed(&ctx, "live", 30);
        seed(&ctx, "lapsed", -1);

        let missing = extract(&ctx, None).unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.to_string(), "Organization ID required");

        let unknown = extract(&ctx, Some("ghost")).unwrap_err();
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

        let lapsed = extract(&ctx, Some("lapsed")).unwrap_err();
        assert_eq!(lapsed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(lapsed.to_string(), "License expired");

        let license = extract(&ctx, Some("live")).unwrap();
        assert_eq!(license.org_name, "Org live");
        assert_eq!(license.branding["theme"], "teal");
    }
}
