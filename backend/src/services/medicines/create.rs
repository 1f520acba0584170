use actix_web::{web, HttpResponse};
use common::model::sponsorship::{Medicine, PaymentStatus};
use common::model::user::Role;
use common::requests::CreateMedicineRequest;
use rusqlite::params;

use crate::auth::AuthUser;
use crate::db::new_id;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub(crate) async fn process(
    user: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateMedicineRequest>,
) -> ApiResult<HttpResponse> {
    user.require_role(&[Role::Pharmacy])?;
    let req = payload.into_inner();
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Medicine name is required"));
    }
    if req.stock < 0 {
        return Err(ApiError::bad_request("Stock cannot be negative"));
    }

    let medicine = Medicine {
        id: new_id(),
        name: name.to_string(),
        stock: req.stock,
        pharmacy_id: user.user_id,
        sponsored: false,
        sponsored_start: None,
        sponsored_end: None,
        payment_status: PaymentStatus::Pending,
        priority: 0,
    };
    let conn = state.db.connect()?;
    conn.execute(
        "INSERT INTO medicines (id, name, stock, pharmacy_id, sponsored, payment_status, priority) \
         VALUES (?1, ?2, ?3, ?4, 0, ?5, 0)",
        params![
            medicine.id,
            medicine.name,
            medicine.stock,
            medicine.pharmacy_id,
            medicine.payment_status.as_str(),
        ],
    )?;
    Ok(HttpResponse::Created().json(medicine))
}
