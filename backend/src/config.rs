use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEV_JWT_SECRET: &str = "healthland-dev-secret";

/// Runtime settings, read from `HEALTHLAND_*` environment variables and an
/// optional file named by `HEALTHLAND_CONFIG_FILE`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub production: bool,
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub password_iterations: u32,
    /// Base64 of a 32-byte AES key for encrypted profile fields. Derived from
    /// `jwt_secret` when unset.
    pub field_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub tesseract_binary: String,
    pub ocr_language: String,
    pub certificate_dir: PathBuf,
    pub trial_days: u32,
    pub search_radius_km: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            production: false,
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_path: PathBuf::from("healthland.sqlite"),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 120,
            password_iterations: 210_000,
            field_key: None,
            llm_api_key: None,
            llm_base_url: "https://api.deepseek.com/v1".to_string(),
            llm_model: "deepseek-chat".to_string(),
            tesseract_binary: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
            certificate_dir: PathBuf::from("uploads"),
            trial_days: 14,
            search_radius_km: 50.0,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Environment::with_prefix("HEALTHLAND").try_parsing(true));

        if let Ok(path) = std::env::var("HEALTHLAND_CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&path));
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.production && self.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::Message(
                "HEALTHLAND_JWT_SECRET must be set in production".to_string(),
            ));
        }
        if self.token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "token_ttl_minutes must be positive".to_string(),
            ));
        }
        if self.password_iterations == 0 {
            return Err(ConfigError::Message(
                "password_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The LLM key, ignoring blank values left in `.env` files.
    pub fn llm_key(&self) -> Option<&str> {
        self.llm_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_checks_outside_production() {
        let settings = Settings::default();
        assert!(settings.check().is_ok());
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.token_ttl_minutes, 120);
    }

    #[test]
    fn production_rejects_dev_secret() {
        let settings = Settings {
            production: true,
            ..Settings::default()
        };
        assert!(settings.check().is_err());
    }

    #[test]
    fn blank_llm_key_counts_as_missing() {
        let settings = Settings {
            llm_api_key: Some("   ".into()),
            ..Settings::default()
        };
        assert_eq!(settings.llm_key(), None);
    }
}
