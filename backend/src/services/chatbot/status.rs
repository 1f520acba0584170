use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::chat::ChatbotStatus;
use serde_json::json;

use super::keywords::EMERGENCY_NUMBER;
use crate::state::AppState;

const CAPABILITIES: &[&str] = &[
    "General health information",
    "Medical terminology explanations",
    "Clinic search by specialty and city",
    "Directions to listed clinics",
    "Emergency guidance",
];

const DISCLAIMERS: &[&str] = &[
    "This assistant does not provide medical diagnoses.",
    "Always consult a qualified healthcare professional for medical advice.",
    "In an emergency, call 14 (SAMU) immediately.",
];

pub(crate) async fn process(state: web::Data<AppState>) -> HttpResponse {
    let status = ChatbotStatus {
        status: "online".to_string(),
        name: "HealthLand AI Assistant".to_string(),
        description: "General health information and clinic guidance for HealthLand users.".to_string(),
        capabilities: CAPABILITIES.iter().map(|c| c.to_string()).collect(),
        disclaimers: DISCLAIMERS.iter().map(|d| d.to_string()).collect(),
        emergency_number: EMERGENCY_NUMBER.to_string(),
        llm_enabled: state.llm.is_some(),
        timestamp: Utc::now(),
    };
    HttpResponse::Ok().json(json!({ "success": true, "data": status }))
}
