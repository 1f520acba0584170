use std::collections::HashSet;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use common::model::clinic::{Clinic, ClinicSearchHit, Coordinates};
use common::model::sponsorship::SponsoredClinic;
use common::requests::NearbyClinicsRequest;
use serde::Deserialize;
use serde_json::{json, Value};

use super::geo::within_radius;
use super::list_all;
use crate::error::{ApiError, ApiResult};
use crate::services::sponsorship::{self, ranking::rank_clinic_hits};
use crate::state::AppState;

const NEARBY_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClinicQuery {
    search: Option<String>,
    specialty: Option<String>,
    location: Option<String>,
    rating: Option<f64>,
    lat: Option<f64>,
    lng: Option<f64>,
}

fn facet(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

impl ClinicQuery {
    fn matches(&self, clinic: &Clinic) -> bool {
        if let Some(needle) = facet(&self.search).map(str::to_lowercase) {
            let hit = clinic.name.to_lowercase().contains(&needle)
                || clinic.address.to_lowercase().contains(&needle)
                || clinic
                    .specialties
                    .iter()
                    .any(|s| s.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if facet(&self.specialty).is_some_and(|s| !clinic.specialties.iter().any(|c| c == s)) {
            return false;
        }
        if facet(&self.location).is_some_and(|l| clinic.location != l) {
            return false;
        }
        self.rating.map_or(true, |min| clinic.rating >= min)
    }

    fn origin(&self) -> Option<Coordinates> {
        let origin = Coordinates {
            latitude: self.lat?,
            longitude: self.lng?,
        };
        origin.is_valid().then_some(origin)
    }
}

pub(crate) async fn process(
    state: web::Data<AppState>,
    query: web::Query<ClinicQuery>,
) -> ApiResult<HttpResponse> {
    let conn = state.db.connect()?;
    let clinics = list_all(&conn)?;
    let sponsorships = sponsorship::load_all(&conn)?;
    let hits = search(
        clinics,
        &sponsorships,
        &query,
        state.settings.search_radius_km,
        Utc::now(),
    );
    Ok(HttpResponse::Ok().json(hits))
}

fn search(
    clinics: Vec<Clinic>,
    sponsorships: &[SponsoredClinic],
    query: &ClinicQuery,
    radius_km: f64,
    now: DateTime<Utc>,
) -> Vec<ClinicSearchHit> {
    let matching: Vec<Clinic> = clinics.into_iter().filter(|c| query.matches(c)).collect();
    match query.origin() {
        Some(origin) => {
            let active: HashSet<&str> = sponsorships
                .iter()
                .filter(|s| s.is_active(now))
                .map(|s| s.clinic_id.as_str())
                .collect();
            within_radius(matching, origin, radius_km)
                .into_iter()
                .map(|(clinic, distance)| ClinicSearchHit {
                    sponsored: active.contains(clinic.id.as_str()),
                    clinic,
                    distance_km: Some(distance),
                })
                .collect()
        }
        None => rank_clinic_hits(matching, sponsorships, now),
    }
}

/// Takes raw JSON so that strings or missing fields get the same answer.
pub(crate) async fn nearby(
    state: web::Data<AppState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let req: NearbyClinicsRequest = serde_json::from_value(payload.into_inner())
        .map_err(|_| ApiError::bad_request("Latitude and longitude are required and must be numbers."))?;
    let origin = Coordinates {
        latitude: req.latitude,
        longitude: req.longitude,
    };
    if !origin.is_valid() {
        return Err(ApiError::bad_request("Coordinates are out of range."));
    }

    let conn = state.db.connect()?;
    let hits: Vec<ClinicSearchHit> = within_radius(list_all(&conn)?, origin, state.settings.search_radius_km)
        .into_iter()
        .take(NEARBY_LIMIT)
        .map(|(clinic, distance)| ClinicSearchHit {
            clinic,
            distance_km: Some(distance),
            sponsored: false,
        })
        .collect();
    Ok(HttpResponse::Ok().json(hits))
}

pub(crate) async fn request_location() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "action": "request_location",
        "message": "Please enable location to find clinics near you.",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clinics::insert;
    use crate::test_support::{test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use std::collections::BTreeMap;

    fn clinic(id: &str, rating: f64, location: &str, specialties: &[&str], at: Option<(f64, f64)>) -> Clinic {
        Clinic {
            id: id.to_string(),
            owner_id: None,
            name: format!("Clinique {id}"),
            address: format!("{id} street"),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            services: vec![],
            rating,
            review_count: 0,
            location: location.to_string(),
            coordinates: at.map(|(latitude, longitude)| Coordinates { latitude, longitude }),
            administrator_name: None,
            phone: None,
            license_number: None,
            accepted_insurance: vec![],
            operating_hours: BTreeMap::new(),
            is_verified: true,
            trial_ends_at: None,
        }
    }

    fn seed(ctx: &TestContext) {
        let conn = ctx.state.db.connect().unwrap();
        for c in [
            clinic("hydra", 4.2, "Algiers", &["Cardiology"], Some((36.7450, 3.0400))),
            clinic("bab-ezzouar", 4.8, "Algiers", &["Pediatrics"], Some((36.7200, 3.1800))),
            clinic("es-senia", 4.9, "Oran", &["Cardiology"], Some((35.6450, -0.6200))),
            clinic("no-gps", 3.1, "Algiers", &["Dermatology"], None),
        ] {
            insert(&conn, &c).unwrap();
        }
    }

    #[test]
    fn facets_and_text_search() {
        let query = ClinicQuery {
            search: Some("CARDIO".into()),
            location: Some("all".into()),
            ..Default::default()
        };
        let all = vec![
            clinic("a", 4.0, "Algiers", &["Cardiology"], None),
            clinic("b", 4.0, "Oran", &["Pediatrics"], None),
        ];
        let hits = search(all.clone(), &[], &query, 50.0, Utc::now());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].clinic.id, "a");

        let query = ClinicQuery {
            rating: Some(4.5),
            ..Default::default()
        };
        assert!(search(all, &[], &query, 50.0, Utc::now()).is_empty());
    }

    #[actix_web::test]
    async fn listing_by_rating_and_by_distance() {
        let ctx = TestContext::new();
        seed(&ctx);
        let app = test_app!(ctx);

        let req = TestRequest::get().uri("/api/clinics").to_request();
        let hits: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = hits.iter().map(|h| h["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["es-senia", "bab-ezzouar", "hydra", "no-gps"]);

        let req = TestRequest::get()
            .uri("/api/clinics?lat=36.7538&lng=3.0588&specialty=Cardiology")
            .to_request();
        let hits: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], "hydra");
        assert!(hits[0]["distanceKm"].as_f64().unwrap() < 5.0);
    }

    #[actix_web::test]
    async fn nearby_requires_numeric_coordinates() {
        let ctx = TestContext::new();
        seed(&ctx);
        let app = test_app!(ctx);

        let req = TestRequest::post()
            .uri("/api/clinics/nearby-clinics")
            .set_json(json!({ "latitude": "36.7", "longitude": 3.05 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Latitude and longitude are required and must be numbers.");

        let req = TestRequest::post()
            .uri("/api/clinics/nearby-clinics")
            .set_json(json!({ "latitude": 36.7538, "longitude": 3.0588 }))
            .to_request();
        let hits: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<&str> = hits.iter().map(|h| h["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["hydra", "bab-ezzouar"]);
    }

    #[actix_web::test]
    async fn request_location_prompt() {
        let ctx = TestContext::new();
        let app = test_app!(ctx);
        let req = TestRequest::post().uri("/api/clinics/request-location").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["action"], "request_location");
    }
}
