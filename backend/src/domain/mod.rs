//! Domain primitives, aggregates, and services.
//!
//! Purpose: model tickets, comments and users, the workflow that moves
//! tickets between states, and the policy deciding who may do so. Nothing in
//! this module knows about HTTP or SQL; adapters reach it through [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `Ticket`, `Comment`, `User`: aggregates and their identifiers.
//! - `policy` / `workflow`: authorization and state-machine operations.
//! - `TicketCommandService`, `TicketQueryService`, `IdentityService`,
//!   `CredentialLoginService`: driving-port implementations.

pub mod auth;
pub mod comment;
pub mod error;
mod identity_service;
pub mod policy;
pub mod ports;
mod service_support;
pub mod ticket;
mod ticket_service;
pub mod trace_id;
pub mod user;
pub mod validation;
pub mod workflow;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::comment::{Comment, CommentId};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_service::{CredentialLoginService, IdentityService};
pub use self::ticket::{
    NewTicket, ParseEnumError, Ticket, TicketError, TicketId, TicketPriority, TicketRecord,
    TicketStatus, link_assignee, link_owner, unlink_assignee,
};
pub use self::ticket_service::{TicketCommandService, TicketQueryService};
pub use self::trace_id::TraceId;
pub use self::user::{DisplayName, Email, PasswordHash, Role, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use ticket_desk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
