//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`TicketRepository`, `UserRepository`, `TicketValidator`)
//! are implemented by outbound adapters. Driving ports (`TicketCommand`,
//! `TicketQuery`, `IdentityQuery`, `LoginService`) are implemented by domain
//! services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_query;
mod login_service;
mod ticket_command;
mod ticket_query;
mod ticket_repository;
mod ticket_validator;
mod user_repository;

#[cfg(test)]
pub use identity_query::MockIdentityQuery;
pub use identity_query::{IdentityPayload, IdentityQuery};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::{
    AddCommentRequest, AssignTicketRequest, CreateTicketRequest, DeleteCommentRequest,
    TicketActionRequest, TicketCommand, UpdateTicketRequest,
};
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::{CommentPayload, TicketPayload, TicketQuery, TicketSummaryPayload};
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketRepository, TicketRepositoryError};
#[cfg(test)]
pub use ticket_validator::MockTicketValidator;
pub use ticket_validator::{TicketValidator, Violation};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
