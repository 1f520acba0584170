use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::tender::{TenderFilter, TenderSort, TenderStatusFilter};
use serde::Deserialize;

use super::list_all;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct TenderQuery {
    search: Option<String>,
    category: Option<String>,
    region: Option<String>,
    status: Option<TenderStatusFilter>,
    sort: Option<TenderSort>,
}

impl From<TenderQuery> for TenderFilter {
    fn from(query: TenderQuery) -> Self {
        TenderFilter {
            search: query.search,
            category: query.category,
            region: query.region,
            status: query.status,
            sort: query.sort,
        }
    }
}

pub(crate) async fn process(
    state: web::Data<AppState>,
    query: web::Query<TenderQuery>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let filter = TenderFilter::from(query.into_inner());
    Ok(HttpResponse::Ok().json(filter.apply(list_all(&conn)?, Utc::now())))
}
