use actix_web::{web, HttpResponse};
use common::model::chat::Intent;
use common::model::clinic::Clinic;
use common::requests::ChatMessageRequest;
use reqwest::Url;
use serde::Serialize;

use super::keywords::{self, classify_intent, emergency_reply, fallback_reply, is_emergency, mentioned, parse_intent};
use super::{ask, checked_message};
use crate::error::{ApiError, ApiResult};
use crate::services::clinics::list_all;
use crate::state::AppState;

const MAX_CLINICS: usize = 10;

const MAPS_SEARCH: &str = "https://www.google.com/maps/search/";

const CLASSIFY_PROMPT: &str = "Classify the user's message for a clinic directory. Answer with \
    exactly one word: finder (looking for a clinic or doctor), symptom (describing how they \
    feel), navigation (asking where a named clinic is) or education (anything else).";

const SYMPTOM_PROMPT: &str = "The user describes symptoms. Give brief, general self-care advice \
    and say when to see a doctor. Do not diagnose.";

const EDUCATION_PROMPT: &str = "Answer the user's health question briefly and in plain language.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SmartReply {
    reply: String,
    intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    clinics: Option<Vec<Clinic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maps_url: Option<String>,
}

impl SmartReply {
    fn text(intent: Intent, reply: String) -> Self {
        Self {
            reply,
            intent,
            clinics: None,
            maps_url: None,
        }
    }
}

/// Classifies the message, then answers it as a clinic search, a symptom
/// question, a directions request or a general question.
pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<ChatMessageRequest>,
) -> ApiResult<HttpResponse> {
    let message = checked_message(&payload.message)?;
    let llm = state.llm.as_ref();

    if is_emergency(message) {
        return Ok(HttpResponse::Ok().json(SmartReply::text(Intent::Symptom, emergency_reply())));
    }

    let intent = match ask(llm, CLASSIFY_PROMPT, message).await {
        Some(answer) => parse_intent(&answer).unwrap_or_else(|| classify_intent(message)),
        None => classify_intent(message),
    };

    let reply = match intent {
        Intent::Finder => {
            let clinics = list_all(&state.db.connect()?)?;
            find_clinics(message, clinics)
        }
        Intent::Navigation => {
            let clinics = list_all(&state.db.connect()?)?;
            locate_clinic(message, &clinics)?
        }
        Intent::Symptom => {
            let advice = ask(llm, SYMPTOM_PROMPT, message)
                .await
                .unwrap_or_else(|| fallback_reply(message));
            let advice = if advice.contains(keywords::DISCLAIMER) {
                advice
            } else {
                format!("{advice}\n\n{}", keywords::DISCLAIMER)
            };
            SmartReply::text(intent, advice)
        }
        Intent::Education => {
            let answer = ask(llm, EDUCATION_PROMPT, message)
                .await
                .unwrap_or_else(|| fallback_reply(message));
            SmartReply::text(intent, answer)
        }
    };
    Ok(HttpResponse::Ok().json(reply))
}

fn find_clinics(message: &str, clinics: Vec<Clinic>) -> SmartReply {
    let mut specialties: Vec<String> = clinics.iter().flat_map(|c| c.specialties.clone()).collect();
    specialties.sort();
    specialties.dedup();
    let mut locations: Vec<String> = clinics.iter().map(|c| c.location.clone()).collect();
    locations.sort();
    locations.dedup();

    let specialty = mentioned(message, &specialties);
    let location = mentioned(message, &locations);
    let label = match (specialty, location) {
        (Some(s), Some(l)) => format!("{s} clinics in {l}"),
        (Some(s), None) => format!("{s} clinics"),
        (None, Some(l)) => format!("clinics in {l}"),
        (None, None) => {
            return SmartReply::text(
                Intent::Finder,
                "Tell me which specialty or city you are looking for and I will list matching clinics."
                    .to_string(),
            )
        }
    };

    let mut matches: Vec<Clinic> = clinics
        .into_iter()
        .filter(|c| specialty.map_or(true, |s| c.specialties.iter().any(|cs| cs == s)))
        .filter(|c| location.map_or(true, |l| c.location == l))
        .collect();
    if matches.is_empty() {
        return SmartReply::text(Intent::Finder, format!("Sorry, I couldn't find any {label}."));
    }
    matches.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    matches.truncate(MAX_CLINICS);
    SmartReply {
        reply: format!("Here are some {label}:"),
        intent: Intent::Finder,
        clinics: Some(matches),
        maps_url: None,
    }
}

fn locate_clinic(message: &str, clinics: &[Clinic]) -> ApiResult<SmartReply> {
    let lower = message.to_lowercase();
    let Some(clinic) = clinics
        .iter()
        .filter(|c| !c.name.is_empty() && lower.contains(&c.name.to_lowercase()))
        .max_by_key(|c| c.name.len())
    else {
        return Ok(SmartReply::text(
            Intent::Navigation,
            "Sorry, I couldn't find that clinic.".to_string(),
        ));
    };
    let url = Url::parse_with_params(MAPS_SEARCH, &[("api", "1"), ("query", clinic.address.as_str())])
        .map_err(|e| ApiError::Internal(format!("maps url: {e}")))?;
    Ok(SmartReply {
        reply: format!("Here is the location for {}:", clinic.name),
        intent: Intent::Navigation,
        clinics: Some(vec![clinic.clone()]),
        maps_url: Some(url.into()),
    })
}
