use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use common::model::analytics::{BucketCount, Period};
use rusqlite::{params, Connection};

use super::{require_report_plan, respond, AnalyticsQuery};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::non_blank;
use crate::state::AppState;

pub(crate) async fn by_doctor(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> ApiResult<HttpResponse> {
    let doctor_id = non_blank(query.doctor_id.clone())
        .ok_or_else(|| ApiError::bad_request("doctorId required"))?;
    let conn = state.db.connect()?;
    require_report_plan(&user, &conn)?;
    let dates = dates_where(&conn, "doctor_id", &doctor_id)?;
    respond(&count_by_bucket(dates, query.period()), &query)
}

pub(crate) async fn by_clinic(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> ApiResult<HttpResponse> {
    let clinic_id = non_blank(query.clinic_id.clone())
        .ok_or_else(|| ApiError::bad_request("clinicId required"))?;
    let conn = state.db.connect()?;
    require_report_plan(&user, &conn)?;
    let dates = dates_where(&conn, "clinic_id", &clinic_id)?;
    respond(&count_by_bucket(dates, query.period()), &query)
}

/// Both filters are optional; without either the breakdown covers every
/// appointment.
pub(crate) async fn by_status(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    require_report_plan(&user, &conn)?;
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM appointments \
         WHERE (?1 IS NULL OR doctor_id = ?1) AND (?2 IS NULL OR clinic_id = ?2) \
         GROUP BY status ORDER BY status",
    )?;
    let rows = stmt
        .query_map(
            params![non_blank(query.doctor_id.clone()), non_blank(query.clinic_id.clone())],
            |row| {
                Ok(BucketCount {
                    id: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    respond(&rows, &query)
}

/// `column` is one of the fixed names above, never caller input.
fn dates_where(conn: &Connection, column: &str, value: &str) -> rusqlite::Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(&format!("SELECT date FROM appointments WHERE {column} = ?1"))?;
    let rows = stmt.query_map(params![value], |row| row.get(0))?;
    rows.collect()
}

fn count_by_bucket(dates: Vec<NaiveDate>, period: Period) -> Vec<BucketCount> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for date in dates {
        *buckets.entry(period.bucket(date)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(id, count)| BucketCount { id, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;
    use crate::test_support::{bearer, test_app, TestContext};
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use chrono::Utc;
    use common::model::user::{PlanType, Role};

    fn seed(ctx: &TestContext) {
        let conn = ctx.state.db.connect().unwrap();
        let rows = [
            ("a1", "dr-1", "c-1", "2025-03-03", "pending"),
            ("a2", "dr-1", "c-1", "2025-03-03", "confirmed"),
            ("a3", "dr-1", "c-2", "2025-03-10", "completed"),
            ("a4", "dr-2", "c-1", "2025-04-01", "pending"),
        ];
        for (id, doctor, clinic, date, status) in rows {
            conn.execute(
                "INSERT INTO appointments (appointment_id, patient_id, doctor_id, clinic_id, date, \
                 time, status, created_at) VALUES (?1, 'p-1', ?2, ?3, ?4, '09:00', ?5, ?6)",
                params![id, doctor, clinic, date, status, Utc::now()],
            )
            .unwrap();
        }
    }

    fn upgrade(ctx: &TestContext, user_id: &str, plan: PlanType) {
        let conn = ctx.state.db.connect().unwrap();
        users::update_plan(&conn, user_id, plan, Utc::now(), None).unwrap();
    }

    #[test]
    fn buckets_are_sorted_keys() {
        let d = |s: &str| s.parse::<NaiveDate>().unwrap();
        let counts = count_by_bucket(vec![d("2025-03-10"), d("2025-03-03"), d("2025-03-04")], Period::Month);
        assert_eq!(
            counts,
            vec![BucketCount {
                id: "2025-03".into(),
                count: 3
            }]
        );
        let counts = count_by_bucket(vec![d("2025-03-10"), d("2025-03-03")], Period::Day);
        let ids: Vec<&str> = counts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["2025-03-03", "2025-03-10"]);
    }

    #[actix_web::test]
    async fn plan_guard_and_grouping() {
        let ctx = TestContext::new();
        let doctor = ctx.create_user("dr-1", Role::Doctor);
        seed(&ctx);
        let app = test_app!(ctx);

        let uri = "/api/analytics/appointments/doctor?doctorId=dr-1&period=week";
        let req = TestRequest::get().uri(uri).insert_header(bearer(&doctor)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        upgrade(&ctx, "dr-1", PlanType::Pro);
        let req = TestRequest::get().uri(uri).insert_header(bearer(&doctor)).to_request();
        let counts: Vec<BucketCount> = test::call_and_read_body_json(&app, req).await;
        let pairs: Vec<(&str, u64)> = counts.iter().map(|c| (c.id.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("2025-09", 2), ("2025-10", 1)]);

        let req = TestRequest::get()
            .uri("/api/analytics/appointments/doctor?doctorId=dr-1&period=year")
            .insert_header(bearer(&doctor))
            .to_request();
        let counts: Vec<BucketCount> = test::call_and_read_body_json(&app, req).await;
        let pairs: Vec<(&str, u64)> = counts.iter().map(|c| (c.id.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("2025-03-03", 2), ("2025-03-10", 1)]);

        let req = TestRequest::get()
            .uri("/api/analytics/appointments/doctor")
            .insert_header(bearer(&doctor))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::get()
            .uri("/api/analytics/appointments/status?clinicId=c-1")
            .insert_header(bearer(&doctor))
            .to_request();
        let counts: Vec<BucketCount> = test::call_and_read_body_json(&app, req).await;
        let pairs: Vec<(&str, u64)> = counts.iter().map(|c| (c.id.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("confirmed", 1), ("pending", 2)]);
    }

    #[actix_web::test]
    async fn basic_plan_is_refused_and_csv_export() {
        let ctx = TestContext::new();
        let basic = ctx.create_user("clinic-basic", Role::Clinic);
        let admin = ctx.create_user("root", Role::Admin);
        upgrade(&ctx, "clinic-basic", PlanType::Basic);
        seed(&ctx);
        let app = test_app!(ctx);

        let uri = "/api/analytics/appointments/clinic?clinicId=c-1&period=month&format=csv";
        let req = TestRequest::get().uri(uri).insert_header(bearer(&basic)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = TestRequest::get().uri(uri).insert_header(bearer(&admin)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap().starts_with("text/csv"));
        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"_id,count\n2025-03,2\n2025-04,1\n");
    }
}
