use actix_web::{web, HttpResponse};
use common::model::analytics::UsageStats;
use rusqlite::Connection;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn process(user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    user.require_admin()?;
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(usage(&conn)?))
}

fn usage(conn: &Connection) -> rusqlite::Result<UsageStats> {
    let count = |sql: &str| -> rusqlite::Result<u64> {
        conn.query_row(sql, [], |row| row.get::<_, i64>(0))
            .map(|n| n as u64)
    };
    Ok(UsageStats {
        users: count("SELECT COUNT(*) FROM users")?,
        patients: count("SELECT COUNT(*) FROM users WHERE role = 'patient'")?,
        doctors: count("SELECT COUNT(*) FROM users WHERE role = 'doctor'")?,
        clinics: count("SELECT COUNT(*) FROM clinics")?,
        suppliers: count("SELECT COUNT(*) FROM users WHERE role = 'supplier'")?,
        logins: count("SELECT COUNT(*) FROM compliance_logs WHERE action = 'login'")?,
    })
}
