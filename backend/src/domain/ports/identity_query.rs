//! Driving port resolving the acting user into an identity view.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Email, Error, Role, User, UserId};

/// Identity returned by `GET /api/v1/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityPayload {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub roles: Vec<Role>,
}

impl From<&User> for IdentityPayload {
    fn from(value: &User) -> Self {
        Self {
            id: *value.id(),
            email: value.email().clone(),
            name: value.display_name().as_str().to_owned(),
            roles: value.roles().into_iter().collect(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityQuery: Send + Sync {
    /// Describe `actor`, failing with `unauthorized` when no actor is bound
    /// or the bound user no longer exists.
    async fn current_identity(&self, actor: Option<UserId>) -> Result<IdentityPayload, Error>;
}
