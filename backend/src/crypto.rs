//! AES-256-GCM for profile fields kept encrypted at rest.
//!
//! Stored form: base64 of `[12-byte nonce | ciphertext + tag]`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ApiError;

const NONCE_LENGTH: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("field key must be base64 of 32 bytes")]
    InvalidKey,
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed")]
    Decrypt,
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; 32],
}

impl FieldCipher {
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| CryptoError::InvalidKey)?;
        let key: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { key })
    }

    /// Fallback when no dedicated key is configured.
    pub fn derive_from_secret(secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"healthland-field-key:");
        hasher.update(secret.as_bytes());
        Self {
            key: hasher.finalize().into(),
        }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, CryptoError> {
        let nonce_bytes: [u8; NONCE_LENGTH] = rand::random();
        let cipher = Aes256Gcm::new((&self.key).into());
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| CryptoError::Encrypt)?;

        let mut output = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        output.extend_from_slice(&nonce_bytes);
        output.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(output))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, CryptoError> {
        let data = STANDARD.decode(encoded).map_err(|_| CryptoError::Decrypt)?;
        if data.len() < NONCE_LENGTH {
            return Err(CryptoError::Decrypt);
        }
        let (nonce, ciphertext) = data.split_at(NONCE_LENGTH);
        Aes256Gcm::new((&self.key).into())
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decrypt)
    }

    pub fn encrypt_json<T: Serialize>(&self, value: &T) -> Result<String, ApiError> {
        let plain = serde_json::to_vec(value)?;
        Ok(self.encrypt(&plain)?)
    }

    pub fn decrypt_json<T: DeserializeOwned>(&self, encoded: &str) -> Result<T, ApiError> {
        let plain = self.decrypt(encoded)?;
        Ok(serde_json::from_slice(&plain)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::user::HealthInfo;

    #[test]
    fn health_info_survives_encryption() {
        let cipher = FieldCipher::derive_from_secret("secret");
        let info = HealthInfo {
            blood_type: Some("O+".into()),
            allergies: vec!["penicillin".into()],
            conditions: vec![],
        };
        let stored = cipher.encrypt_json(&info).unwrap();
        assert!(!stored.contains("penicillin"));
        let back: HealthInfo = cipher.decrypt_json(&stored).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let stored = FieldCipher::derive_from_secret("a").encrypt(b"O+").unwrap();
        assert!(FieldCipher::derive_from_secret("b").decrypt(&stored).is_err());
    }

    #[test]
    fn configured_key_must_be_32_bytes() {
        assert!(FieldCipher::from_base64(&STANDARD.encode([7u8; 32])).is_ok());
        assert!(FieldCipher::from_base64(&STANDARD.encode([7u8; 16])).is_err());
        assert!(FieldCipher::from_base64("not base64!").is_err());
    }
}
