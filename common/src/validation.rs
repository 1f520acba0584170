//! Field rules shared by the registration wizard and the backend handlers.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex"));

/// Minimum password length accepted anywhere in the platform.
pub const MIN_PASSWORD_LEN: usize = 8;

pub const PASSWORD_RULE: &str =
    "Password must be at least 8 characters, include a number and an uppercase letter";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least eight characters with one ASCII uppercase letter and one digit.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Accepts digits with an optional leading `+`; spaces, dashes and dots are ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect();
    PHONE_RE.is_match(&compact)
}
