//! Keyword rules used when no LLM is configured, when it fails, and always
//! for emergency detection and the role assistant.

use std::sync::LazyLock;

use common::model::chat::{AssistantRole, Intent};
use regex::Regex;

pub const EMERGENCY_NUMBER: &str = "14";

pub const DISCLAIMER: &str = "This is not medical advice. Please consult a healthcare professional.";

const EMERGENCY_KEYWORDS: &[&str] = &[
    "emergency",
    "chest pain",
    "heart attack",
    "can't breathe",
    "cannot breathe",
    "difficulty breathing",
    "unconscious",
    "severe bleeding",
    "stroke",
    "seizure",
    "overdose",
    "poisoning",
    "choking",
    "suicide",
];

const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Navigation,
        &["where is", "directions", "how do i get", "how to get", "address of", "map"],
    ),
    (
        Intent::Finder,
        &["find", "looking for", "search", "near", "recommend", "specialist"],
    ),
    (
        Intent::Symptom,
        &["pain", "fever", "cough", "headache", "symptom", "hurts", "sick", "nausea", "dizzy"],
    ),
];

/// Case-insensitive alternation matching whole words only.
fn word_pattern(words: &[&str]) -> Regex {
    let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).expect("valid keyword pattern")
}

static EMERGENCY_RE: LazyLock<Regex> = LazyLock::new(|| word_pattern(EMERGENCY_KEYWORDS));

static INTENT_RES: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    INTENT_KEYWORDS
        .iter()
        .map(|(intent, words)| (*intent, word_pattern(words)))
        .collect()
});

pub fn is_emergency(message: &str) -> bool {
    EMERGENCY_RE.is_match(message)
}

pub fn emergency_reply() -> String {
    format!(
        "URGENT: this sounds like a medical emergency. Call {EMERGENCY_NUMBER} (SAMU) now or go to \
         the nearest emergency department. Do not wait for an online answer."
    )
}

const TOPICS: &[(&[&str], &str)] = &[
    (
        &["appointment", "book", "rendez-vous"],
        "You can book an appointment from any clinic page: pick a doctor, a date and a time slot.",
    ),
    (
        &["fever", "temperature"],
        "For a mild fever, rest, drink plenty of fluids and monitor your temperature. See a doctor \
         if it goes above 39°C or lasts more than three days.",
    ),
    (
        &["headache", "migraine"],
        "Headaches often ease with rest, hydration and a quiet, dark room. Seek care if the pain is \
         sudden and severe or comes with vision problems.",
    ),
    (
        &["vaccine", "vaccination"],
        "Vaccination schedules depend on age and health. Your doctor or the nearest health centre \
         can check which vaccines you are due for.",
    ),
    (
        &["clinic", "hospital", "doctor"],
        "Use the clinic search to filter by specialty, city and rating, or share your location to \
         see clinics near you.",
    ),
];

const GENERAL_HELP: &str = "I can share general health information, explain medical terms and help \
    you find clinics. What would you like to know?";

/// Answer for the plain chat when no model is available.
pub fn fallback_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    let answer = TOPICS
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| lower.contains(k)))
        .map_or(GENERAL_HELP, |(_, answer)| answer);
    format!("{answer}\n\n{DISCLAIMER}")
}

/// First matching rule wins, so navigation beats finder for
/// "where is the clinic ...".
pub fn classify_intent(message: &str) -> Intent {
    INTENT_RES
        .iter()
        .find(|(_, re)| re.is_match(message))
        .map_or(Intent::Education, |(intent, _)| *intent)
}

/// Reads an intent out of a free-text model answer.
pub fn parse_intent(answer: &str) -> Option<Intent> {
    let lower = answer.to_lowercase();
    Intent::ALL
        .iter()
        .copied()
        .find(|intent| lower.contains(intent.as_str()))
}

/// The first candidate the message mentions. A candidate also matches on
/// its first six letters, so "cardiologist" finds "Cardiology".
pub fn mentioned<'a>(message: &str, candidates: &'a [String]) -> Option<&'a str> {
    let lower = message.to_lowercase();
    candidates
        .iter()
        .find(|candidate| {
            let c = candidate.to_lowercase();
            let stem: String = c.chars().take(6).collect();
            !c.is_empty() && (lower.contains(&c) || (stem.chars().count() == 6 && lower.contains(&stem)))
        })
        .map(String::as_str)
}

const PATIENT_ANSWERS: &[(&str, &str)] = &[
    ("find clinic", "I can help you find clinics near you. Share your location or pick a city."),
    ("appointment", "Search for a clinic, then choose a doctor and a free time slot to book."),
    ("vaccine", "Common vaccines include flu, COVID-19 and hepatitis. Ask your doctor what you need."),
    ("emergency", "For emergencies call 14 (SAMU) immediately."),
];

const CLINIC_ANSWERS: &[(&str, &str)] = &[
    ("security", "The security suite runs device scans and keeps a compliance trail for audits."),
    ("analytics", "Analytics shows appointments per period, status breakdowns and stock trends."),
    ("subscription", "Manage your plan from the dashboard; Pro and Enterprise unlock analytics."),
    ("compliance", "Compliance history lists every device scan recorded for your account."),
];

const SUPPLIER_ANSWERS: &[(&str, &str)] = &[
    ("bid", "Open the marketplace, pick an open tender and apply before its deadline."),
    ("tender", "Filter tenders by category, region, closing date or value in the marketplace."),
    ("contact", "Each tender lists the publishing clinic and, when given, a contact person."),
];

const ASSISTANT_HELP: &str = "I'm here to help! Ask me anything about using HealthLand.";

pub fn assistant_reply(role: AssistantRole, message: &str) -> &'static str {
    let table = match role {
        AssistantRole::Patient => PATIENT_ANSWERS,
        AssistantRole::Clinic => CLINIC_ANSWERS,
        AssistantRole::Supplier => SUPPLIER_ANSWERS,
    };
    let lower = message.to_lowercase();
    table
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map_or(ASSISTANT_HELP, |(_, answer)| answer)
}
