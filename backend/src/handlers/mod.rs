use actix_web::{web, HttpResponse};
use shared::ApiError;

pub mod auth;
pub mod expenses;
pub mod trackers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure)
        .configure(trackers::configure)
        .configure(expenses::configure);
}

/// Uniform 401 for every authentication failure, with the bearer challenge
/// header. Deliberately does not say which step failed.
pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header(("WWW-Authenticate", "Bearer"))
        .json(ApiError {
            error: "unauthorized".to_string(),
            message: "Could not validate credentials".to_string(),
        })
}
