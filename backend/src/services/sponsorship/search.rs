use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::clinic::Clinic;
use common::model::sponsorship::SponsoredClinic;
use serde::Serialize;

use super::load_all;
use super::ranking::{rank_medicines, rank_sponsored_clinics};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{clinics, medicines};
use crate::state::AppState;

/// A live sponsorship with the clinic profile attached when one exists.
#[derive(Serialize)]
struct SponsoredListing {
    #[serde(flatten)]
    sponsorship: SponsoredClinic,
    clinic: Option<Clinic>,
}

pub(crate) async fn clinics(_user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let ranked = rank_sponsored_clinics(load_all(&conn)?, Utc::now());
    let listings = ranked
        .into_iter()
        .map(|sponsorship| {
            let clinic = clinics::find(&conn, &sponsorship.clinic_id)?;
            Ok(SponsoredListing { sponsorship, clinic })
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(HttpResponse::Ok().json(listings))
}

pub(crate) async fn medicines(_user: AuthUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    Ok(HttpResponse::Ok().json(rank_medicines(medicines::list_all(&conn)?)))
}
