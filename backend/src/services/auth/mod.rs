//! Account creation and sign-in.
//!
//! - `POST /api/auth/register`: creates an account and returns it with a
//!   token. Doctors and hospitals must attach a licence certificate, which
//!   is stored under `certificate_dir` named by its md5.
//! - `POST /api/auth/login`: exchanges a user id or e-mail plus password for
//!   a token, leaving a compliance entry behind.
//! - `GET /api/auth/users`: admin listing of every account.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod certificate;
mod login;
mod register;
mod users;

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/register", post().to(register::process))
        .route("/login", post().to(login::process))
        .route("/users", get().to(users::process))
}
