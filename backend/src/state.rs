use std::sync::Arc;

use log::{info, warn};

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Settings;
use crate::crypto::{CryptoError, FieldCipher};
use crate::db::Db;
use crate::llm::LlmClient;
use crate::ocr::{OcrEngine, TesseractCli};
use crate::services::chatbot::history::ChatSessions;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("field key: {0}")]
    Crypto(#[from] CryptoError),
    #[error("database: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("filesystem: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a handler needs, registered once as `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: Db,
    pub passwords: PasswordHasher,
    pub tokens: TokenService,
    pub cipher: FieldCipher,
    pub ocr: Arc<dyn OcrEngine>,
    pub llm: Option<LlmClient>,
    pub chats: ChatSessions,
}

impl AppState {
    /// Migrates the database and creates the upload directory.
    pub fn new(settings: Settings) -> Result<Self, StartupError> {
        let cipher = match settings.field_key.as_deref() {
            Some(key) => FieldCipher::from_base64(key)?,
            None => {
                warn!("HEALTHLAND_FIELD_KEY not set, deriving the health-field key from the JWT secret");
                FieldCipher::derive_from_secret(&settings.jwt_secret)
            }
        };

        let db = Db::new(&settings.database_path);
        db.migrate()?;
        std::fs::create_dir_all(&settings.certificate_dir)?;

        let llm = LlmClient::from_settings(&settings)?;
        match &llm {
            Some(client) => info!("chatbot answers through {}", client.model()),
            None => info!("no LLM key configured, chatbot uses keyword answers"),
        }

        Ok(Self {
            passwords: PasswordHasher::new(settings.password_iterations),
            tokens: TokenService::new(&settings.jwt_secret, settings.token_ttl_minutes),
            ocr: Arc::new(TesseractCli::new(
                settings.tesseract_binary.clone(),
                settings.ocr_language.clone(),
            )),
            cipher,
            db,
            llm,
            chats: ChatSessions::default(),
            settings: Arc::new(settings),
        })
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrEngine>) -> Self {
        self.ocr = ocr;
        self
    }
}
