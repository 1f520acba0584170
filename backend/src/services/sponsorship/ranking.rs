//! Placement order for sponsored listings. Pure functions over loaded rows
//! so the rules can be tested without a database.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::model::clinic::{Clinic, ClinicSearchHit};
use common::model::sponsorship::{Medicine, SponsoredClinic};

/// Sponsorships that currently count (featured, paid, not past `end`),
/// highest priority first.
pub fn rank_sponsored_clinics(rows: Vec<SponsoredClinic>, now: DateTime<Utc>) -> Vec<SponsoredClinic> {
    let mut active: Vec<SponsoredClinic> = rows.into_iter().filter(|s| s.is_active(now)).collect();
    active.sort_by(|a, b| b.priority.cmp(&a.priority));
    active
}

/// Default clinic listing: active sponsors first by priority, then
/// everyone by rating. Ties keep their input order.
pub fn rank_clinic_hits(
    clinics: Vec<Clinic>,
    sponsorships: &[SponsoredClinic],
    now: DateTime<Utc>,
) -> Vec<ClinicSearchHit> {
    let priorities: HashMap<&str, i64> = sponsorships
        .iter()
        .filter(|s| s.is_active(now))
        .map(|s| (s.clinic_id.as_str(), s.priority))
        .collect();

    let mut ranked: Vec<(Option<i64>, ClinicSearchHit)> = clinics
        .into_iter()
        .map(|clinic| {
            let priority = priorities.get(clinic.id.as_str()).copied();
            let hit = ClinicSearchHit {
                clinic,
                distance_km: None,
                sponsored: priority.is_some(),
            };
            (priority, hit)
        })
        .collect();

    ranked.sort_by(|(pa, a), (pb, b)| {
        compare_sponsorship(*pa, *pb).then_with(|| b.clinic.rating.total_cmp(&a.clinic.rating))
    });
    ranked.into_iter().map(|(_, hit)| hit).collect()
}

/// Sponsored before unsponsored, then higher priority first.
fn compare_sponsorship(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sponsored medicines first, then by priority, then by name.
pub fn rank_medicines(mut medicines: Vec<Medicine>) -> Vec<Medicine> {
    medicines.sort_by(|a, b| {
        b.sponsored
            .cmp(&a.sponsored)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| a.name.cmp(&b.name))
    });
    medicines
}
