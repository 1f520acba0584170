//! Fixtures for handler tests: a throwaway database, fast password hashing
//! and a canned OCR engine.

use std::sync::Arc;

use actix_web::http::header::{HeaderName, AUTHORIZATION};
use actix_web::web;
use chrono::Utc;
use common::model::user::{Role, User};
use tempfile::TempDir;

use crate::config::Settings;
use crate::db::users;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::ocr::{OcrEngine, StaticOcr};
use crate::state::AppState;

pub const PASSWORD: &str = "Password123";

pub struct TestContext {
    pub dir: TempDir,
    pub state: web::Data<AppState>,
    pub jobs: web::Data<JobsState>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_ocr(Arc::new(StaticOcr::new("Paracetamol 500mg", 91.0)))
    }

    pub fn with_ocr(ocr: Arc<dyn OcrEngine>) -> Self {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            database_path: dir.path().join("test.sqlite"),
            certificate_dir: dir.path().join("uploads"),
            password_iterations: 1_000,
            ..Settings::default()
        };
        let state = AppState::new(settings).unwrap().with_ocr(ocr);

        let (jobs, rx) = JobsState::new();
        if tokio::runtime::Handle::try_current().is_ok() {
            tokio::spawn(start_job_updater(jobs.clone(), rx));
        }

        Self {
            dir,
            state: web::Data::new(state),
            jobs: web::Data::new(jobs),
        }
    }

    pub fn data(&self) -> web::Data<AppState> {
        self.state.clone()
    }

    /// Inserts a user with [`PASSWORD`] and returns a token for it.
    pub fn create_user(&self, user_id: &str, role: Role) -> String {
        let user = User {
            user_id: user_id.to_string(),
            name: format!("{user_id} name"),
            email: format!("{user_id}@example.com"),
            role,
            clinic_id: None,
            certificate: None,
            first_name: None,
            last_name: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            health_info: None,
            plan_type: None,
            plan_activated_at: None,
            plan_expires_at: None,
            created_at: Utc::now(),
        };
        let conn = self.state.db.connect().unwrap();
        users::insert(&conn, &user, &self.state.passwords.hash(PASSWORD)).unwrap();
        self.state.tokens.issue(&user).unwrap()
    }
}

pub fn bearer(token: &str) -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

/// Builds the full application around a [`TestContext`].
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.jobs.clone())
                .configure(crate::services::configure),
        )
        .await
    };
}

pub(crate) use test_app;
