use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::sponsorship::{InventoryAction, InventoryLog, Medicine};
use common::requests::InventoryRequest;
use rusqlite::{params, Connection};
use serde_json::json;

use super::find;
use crate::auth::AuthUser;
use crate::db::{new_id, write_transaction};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<InventoryRequest>,
) -> ApiResult<HttpResponse> {
    let req = payload.into_inner();
    if req.quantity <= 0 {
        return Err(ApiError::bad_request("quantity must be positive"));
    }
    let mut conn = state.db.connect()?;
    let (medicine, log) = apply(&mut conn, &user, &id, req)?;
    Ok(HttpResponse::Ok().json(json!({ "medicine": medicine, "log": log })))
}

fn apply(
    conn: &mut Connection,
    user: &AuthUser,
    medicine_id: &str,
    req: InventoryRequest,
) -> ApiResult<(Medicine, InventoryLog)> {
    let tx = write_transaction(conn)?;
    let mut medicine = find(&tx, medicine_id)?.ok_or_else(|| ApiError::not_found("Medicine not found"))?;
    if !user.is_self_or_admin(&medicine.pharmacy_id) {
        return Err(ApiError::forbidden("Only the owning pharmacy can change stock"));
    }

    medicine.stock = match req.action {
        InventoryAction::Restocked => medicine
            .stock
            .checked_add(req.quantity)
            .ok_or_else(|| ApiError::bad_request("Stock would overflow"))?,
        InventoryAction::Consumed if req.quantity > medicine.stock => {
            return Err(ApiError::conflict(format!(
                "Only {} units of {} in stock",
                medicine.stock, medicine.name
            )));
        }
        InventoryAction::Consumed => medicine.stock - req.quantity,
    };

    let log = InventoryLog {
        id: new_id(),
        medicine_id: medicine.id.clone(),
        pharmacy_id: medicine.pharmacy_id.clone(),
        action: req.action,
        quantity: req.quantity,
        date: Utc::now(),
    };
    tx.execute(
        "UPDATE medicines SET stock = ?1 WHERE id = ?2",
        params![medicine.stock, medicine.id],
    )?;
    tx.execute(
        "INSERT INTO inventory_logs (id, medicine_id, pharmacy_id, action, quantity, date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            log.id,
            log.medicine_id,
            log.pharmacy_id,
            log.action.as_str(),
            log.quantity,
            log.date,
        ],
    )?;
    tx.commit()?;
    Ok((medicine, log))
}

#[cfg(test)]
mod tests {
    use super::apply;
    use crate::auth::AuthUser;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use common::model::sponsorship::{InventoryAction, Medicine};
    use common::requests::InventoryRequest;
    use common::model::user::Role;
    use serde_json::{json, Value};
    use std::thread;

    #[actix_web::test]
    async fn stock_moves_and_is_logged() {
        let ctx = TestContext::new();
        let pharmacy = ctx.create_user("ph-1", Role::Pharmacy);
        let rival = ctx.create_user("ph-2", Role::Pharmacy);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/medicines")
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "name": "Doliprane 1g", "stock": 5 }))
            .to_request();
        let medicine: Medicine = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/medicines/{}/inventory", medicine.id);

        let req = TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "action": "consumed", "quantity": 3 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["medicine"]["stock"], 2);
        assert_eq!(body["log"]["action"], "consumed");

        let req = TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "action": "consumed", "quantity": 3 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&rival))
            .set_json(json!({ "action": "restocked", "quantity": 10 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::post()
            .uri(&uri)
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "action": "restocked", "quantity": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let conn = ctx.state.db.connect().unwrap();
        let (stock, logs): (i64, i64) = conn
            .query_row(
                "SELECT stock, (SELECT COUNT(*) FROM inventory_logs) FROM medicines",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((stock, logs), (2, 1));

        let req = TestRequest::get()
            .uri("/api/medicines")
            .insert_header(bearer(&rival))
            .to_request();
        let listed: Vec<Medicine> = test::call_and_read_body_json(&app, req).await;
        assert!(listed.is_empty());
    }

    #[actix_web::test]
    async fn restock_past_i64_is_rejected() {
        let ctx = TestContext::new();
        let pharmacy = ctx.create_user("ph-1", Role::Pharmacy);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/medicines")
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "name": "Augmentin", "stock": 5 }))
            .to_request();
        let medicine: Medicine = test::call_and_read_body_json(&app, req).await;

        let req = TestRequest::post()
            .uri(&format!("/api/medicines/{}/inventory", medicine.id))
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "action": "restocked", "quantity": i64::MAX }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let conn = ctx.state.db.connect().unwrap();
        let stock: i64 = conn
            .query_row("SELECT stock FROM medicines", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stock, 5);
    }

    #[actix_web::test]
    async fn concurrent_consumption_never_fails_on_lock() {
        let ctx = TestContext::new();
        let pharmacy = ctx.create_user("ph-1", Role::Pharmacy);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/medicines")
            .insert_header(bearer(&pharmacy))
            .set_json(json!({ "name": "Smecta", "stock": 8 }))
            .to_request();
        let medicine: Medicine = test::call_and_read_body_json(&app, req).await;

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let db = ctx.state.db.clone();
                let medicine_id = medicine.id.clone();
                thread::spawn(move || {
                    let user = AuthUser {
                        user_id: "ph-1".to_string(),
                        role: Role::Pharmacy,
                        plan_type: None,
                    };
                    let req = InventoryRequest {
                        action: InventoryAction::Consumed,
                        quantity: 1,
                    };
                    apply(&mut db.connect().unwrap(), &user, &medicine_id, req)
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        let conn = ctx.state.db.connect().unwrap();
        let (stock, logs): (i64, i64) = conn
            .query_row(
                "SELECT stock, (SELECT COUNT(*) FROM inventory_logs) FROM medicines",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!((stock, logs), (0, 8));
    }
}
