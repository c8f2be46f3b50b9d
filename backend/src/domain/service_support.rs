//! Port error mapping shared by the domain services.

use tracing::{debug, error};

use crate::domain::ports::{TicketRepositoryError, UserPersistenceError};
use crate::domain::{Error, TicketError};

pub(crate) fn map_repository_error(error: TicketRepositoryError) -> Error {
    debug!(%error, "ticket repository failure");
    match error {
        TicketRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ticket repository unavailable: {message}"))
        }
        TicketRepositoryError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    debug!(%error, "user repository failure");
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Aggregate misuse is a programming error, never a caller mistake.
impl From<TicketError> for Error {
    fn from(value: TicketError) -> Self {
        error!(error = %value, "ticket aggregate misuse");
        Self::internal(format!("ticket invariant violated: {value}"))
    }
}
