//! White-label organizations and their licences.
//!
//! - `GET /api/orgs`, `GET /api/orgs/{id}`: public reads.
//! - `POST`, `PUT /{id}`, `DELETE /{id}`: admins only.
//! - `GET /api/orgs/branding`: the branding of the organization named by
//!   `x-org-id`, behind the [`License`](crate::auth::License) guard.

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

mod branding;
mod create;
mod get;
mod list;
mod remove;
mod update;

const API_PATH: &str = "/api/orgs";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/branding", get().to(branding::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", put().to(update::process))
        .route("/{id}", delete().to(remove::process))
}
