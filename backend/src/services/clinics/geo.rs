use common::model::clinic::{Clinic, Coordinates};
use rayon::prelude::*;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Clinics with coordinates inside `radius_km` of `origin`, nearest first.
pub fn within_radius(clinics: Vec<Clinic>, origin: Coordinates, radius_km: f64) -> Vec<(Clinic, f64)> {
    let mut near: Vec<(Clinic, f64)> = clinics
        .into_par_iter()
        .filter_map(|clinic| {
            let distance = haversine_km(origin, clinic.coordinates?);
            (distance <= radius_km).then_some((clinic, distance))
        })
        .collect();
    near.sort_by(|a, b| a.1.total_cmp(&b.1));
    near
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const ALGIERS: Coordinates = Coordinates {
        latitude: 36.7538,
        longitude: 3.0588,
    };
    const BLIDA: Coordinates = Coordinates {
        latitude: 36.4700,
        longitude: 2.8277,
    };
    const ORAN: Coordinates = Coordinates {
        latitude: 35.6971,
        longitude: -0.6308,
    };

    fn clinic(id: &str, coordinates: Option<Coordinates>) -> Clinic {
        Clinic {
            id: id.to_string(),
            owner_id: None,
            name: id.to_string(),
            address: String::new(),
            specialties: vec![],
            services: vec![],
            rating: 0.0,
            review_count: 0,
            location: String::new(),
            coordinates,
            administrator_name: None,
            phone: None,
            license_number: None,
            accepted_insurance: vec![],
            operating_hours: BTreeMap::new(),
            is_verified: false,
            trial_ends_at: None,
        }
    }

    #[test]
    fn known_distances() {
        assert_eq!(haversine_km(ALGIERS, ALGIERS), 0.0);
        let blida = haversine_km(ALGIERS, BLIDA);
        assert!((30.0..45.0).contains(&blida), "{blida}");
        let oran = haversine_km(ALGIERS, ORAN);
        assert!((340.0..365.0).contains(&oran), "{oran}");
    }

    #[test]
    fn keeps_nearby_clinics_nearest_first() {
        let clinics = vec![
            clinic("oran", Some(ORAN)),
            clinic("blida", Some(BLIDA)),
            clinic("unknown", None),
            clinic("centre", Some(ALGIERS)),
        ];
        let near = within_radius(clinics, ALGIERS, 50.0);
        let ids: Vec<&str> = near.iter().map(|(c, _)| c.id.as_str()).collect();
        assert_eq!(ids, vec!["centre", "blida"]);
    }
}
