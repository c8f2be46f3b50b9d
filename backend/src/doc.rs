//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] gathers every `/api/v1` endpoint and the health probes. It is
//! served by Swagger UI in debug builds and exported by the `openapi-dump`
//! binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{CommentPayload, IdentityPayload, TicketPayload, TicketSummaryPayload};
use crate::domain::{Error, ErrorCode, TicketPriority, TicketStatus};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::comments::AddCommentBody;
use crate::inbound::http::tickets::{AssignTicketBody, CreateTicketBody, UpdateTicketBody};

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Ticket desk API",
        description = "Session-authenticated ticket tracking with an owner/assignee workflow."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::update_ticket,
        crate::inbound::http::tickets::delete_ticket,
        crate::inbound::http::tickets::assign_ticket,
        crate::inbound::http::tickets::unassign_ticket,
        crate::inbound::http::tickets::start_ticket,
        crate::inbound::http::tickets::close_ticket,
        crate::inbound::http::tickets::my_tickets,
        crate::inbound::http::tickets::assigned_tickets,
        crate::inbound::http::comments::add_comment,
        crate::inbound::http::comments::delete_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        TicketPriority,
        TicketStatus,
        TicketPayload,
        TicketSummaryPayload,
        CommentPayload,
        IdentityPayload,
        LoginRequest,
        CreateTicketBody,
        UpdateTicketBody,
        AssignTicketBody,
        AddCommentBody,
    )),
    tags(
        (name = "session", description = "Login, logout and the current identity"),
        (name = "tickets", description = "Ticket lifecycle"),
        (name = "comments", description = "Ticket comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/tickets/{id}/assign")]
    #[case("/api/v1/tickets/{id}/comments/{comment_id}")]
    #[case("/api/v1/assigned-tickets")]
    #[case("/health/ready")]
    fn document_lists_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
        assert!(components.schemas.contains_key("TicketPayload"));
    }
}
