use actix_web::web::{get, scope};
use actix_web::Scope;

mod list;

const API_PATH: &str = "/api/logs";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(list::process))
}
