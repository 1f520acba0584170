use chrono::{Duration, Utc};
use common::model::user::{PlanType, Role, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// HS256 claims. Field names match what the web client decodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub plan_type: Option<PlanType>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.user_id.clone(),
            role: user.role,
            plan_type: user.plan_type,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            user_id: "dr.house".into(),
            name: "Gregory House".into(),
            email: "house@example.com".into(),
            role: Role::Doctor,
            clinic_id: None,
            certificate: Some("abc.pdf".into()),
            first_name: None,
            last_name: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            health_info: None,
            plan_type: Some(PlanType::Pro),
            plan_activated_at: None,
            plan_expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = TokenService::new("secret", 120);
        let token = tokens.issue(&user()).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, "dr.house");
        assert_eq!(claims.role, Role::Doctor);
        assert_eq!(claims.plan_type, Some(PlanType::Pro));
        assert_eq!(claims.exp - claims.iat, 120 * 60);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenService::new("secret", 120).issue(&user()).unwrap();
        assert!(TokenService::new("other", 120).verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("secret", -5);
        let token = tokens.issue(&user()).unwrap();
        assert!(tokens.verify(&token).is_err());
    }
}
