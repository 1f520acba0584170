use actix_web::web::{get, put, scope};
use actix_web::Scope;

mod change_password;
mod get;
mod update;

const API_PATH: &str = "/api/profile";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::process))
        .route("", put().to(update::process))
        .route("/change-password", put().to(change_password::process))
}
