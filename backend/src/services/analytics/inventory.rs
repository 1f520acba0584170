use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::analytics::{BucketTotal, Period};
use common::model::sponsorship::Medicine;
use rusqlite::params;

use super::{require_report_plan, respond, AnalyticsQuery};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::medicines;
use crate::services::non_blank;
use crate::state::AppState;

const DEFAULT_LOW_STOCK: i64 = 10;

/// Units consumed per period. Restocks are not counted.
pub(crate) async fn consumption(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    require_report_plan(&user, &conn)?;
    let mut stmt = conn.prepare(
        "SELECT date, quantity FROM inventory_logs WHERE action = 'consumed' \
         AND (?1 IS NULL OR pharmacy_id = ?1) AND (?2 IS NULL OR medicine_id = ?2)",
    )?;
    let entries = stmt
        .query_map(
            params![non_blank(query.pharmacy_id.clone()), non_blank(query.medicine_id.clone())],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?
        .collect::<rusqlite::Result<Vec<(DateTime<Utc>, i64)>>>()?;
    respond(&total_by_bucket(entries, query.period()), &query)
}

pub(crate) async fn low_stock(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AnalyticsQuery>,
) -> ApiResult<HttpResponse> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK);
    if threshold < 0 {
        return Err(ApiError::bad_request("threshold cannot be negative"));
    }
    let conn = state.db.connect()?;
    require_report_plan(&user, &conn)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM medicines WHERE stock <= ?1 AND (?2 IS NULL OR pharmacy_id = ?2) \
         ORDER BY stock, name",
        medicines::COLUMNS
    ))?;
    let rows = stmt
        .query_map(
            params![threshold, non_blank(query.pharmacy_id.clone())],
            medicines::map_row,
        )?
        .collect::<rusqlite::Result<Vec<Medicine>>>()?;
    respond(&rows, &query)
}

fn total_by_bucket(entries: Vec<(DateTime<Utc>, i64)>, period: Period) -> Vec<BucketTotal> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for (date, quantity) in entries {
        *buckets.entry(period.bucket(date.date_naive())).or_default() += quantity;
    }
    buckets
        .into_iter()
        .map(|(id, total)| BucketTotal { id, total })
        .collect()
}
