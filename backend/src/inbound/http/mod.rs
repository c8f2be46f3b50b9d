//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod comments;
pub mod error;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod tickets;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` endpoint on the given scope configuration.
///
/// Callers wrap the scope with session middleware; handlers expect a
/// [`state::HttpState`] in app data.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .service(auth::login)
        .service(auth::logout)
        .service(auth::me)
        .service(tickets::create_ticket)
        .service(tickets::my_tickets)
        .service(tickets::assigned_tickets)
        .service(tickets::get_ticket)
        .service(tickets::update_ticket)
        .service(tickets::delete_ticket)
        .service(tickets::assign_ticket)
        .service(tickets::unassign_ticket)
        .service(tickets::start_ticket)
        .service(tickets::close_ticket)
        .service(comments::add_comment)
        .service(comments::delete_comment);
}
