use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::tender::Tender;
use common::model::user::Role;
use rusqlite::{params, Connection};
use serde_json::json;

use super::find;
use crate::auth::AuthUser;
use crate::db::{to_json, write_transaction};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Applying twice is a no-op; the supplier is whoever holds the token.
pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    if user.role != Role::Supplier {
        return Err(ApiError::forbidden("Only suppliers can apply to tenders"));
    }
    let mut conn = state.db.connect()?;
    let tender = apply(&mut conn, &id, &user.user_id)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Applied successfully", "tender": tender })))
}

fn apply(conn: &mut Connection, tender_id: &str, supplier_id: &str) -> ApiResult<Tender> {
    let tx = write_transaction(conn)?;
    let mut tender = find(&tx, tender_id)?.ok_or_else(|| ApiError::not_found("Tender not found"))?;
    if !tender.accepts_applications(Utc::now()) {
        return Err(ApiError::conflict("Tender is closed"));
    }
    if !tender.applicants.iter().any(|a| a == supplier_id) {
        tender.applicants.push(supplier_id.to_string());
        tx.execute(
            "UPDATE tenders SET applicants = ?1 WHERE id = ?2",
            params![to_json(&tender.applicants)?, tender.id],
        )?;
    }
    tx.commit()?;
    Ok(tender)
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::test::{self, TestRequest};
    use chrono::{Duration, Utc};
    use common::model::tender::Tender;
    use common::model::user::Role;
    use serde_json::json;
    use std::thread;

    #[actix_web::test]
    async fn simultaneous_applications_are_all_kept() {
        let ctx = TestContext::new();
        let clinic = ctx.create_user("clinic-1", Role::Clinic);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/tenders")
            .insert_header(bearer(&clinic))
            .set_json(json!({ "title": "Syringes", "deadline": Utc::now() + Duration::days(10) }))
            .to_request();
        let tender: Tender = test::call_and_read_body_json(&app, req).await;

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let db = ctx.state.db.clone();
                let tender_id = tender.id.clone();
                thread::spawn(move || {
                    let mut conn = db.connect().unwrap();
                    apply(&mut conn, &tender_id, &format!("supplier-{i}"))
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        let req = TestRequest::get()
            .uri(&format!("/api/tenders/{}", tender.id))
            .to_request();
        let stored: Tender = test::call_and_read_body_json(&app, req).await;
        let mut applicants = stored.applicants;
        applicants.sort();
        let expected: Vec<String> = (0..8).map(|i| format!("supplier-{i}")).collect();
        assert_eq!(applicants, expected);
    }
}
