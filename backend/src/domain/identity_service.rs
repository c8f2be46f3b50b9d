//! Identity and login services backed by the user repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{IdentityPayload, IdentityQuery, LoginService, UserRepository};
use crate::domain::service_support::map_user_error;
use crate::domain::{Error, LoginCredentials, UserId};

/// Resolves the session actor into an identity view.
#[derive(Clone)]
pub struct IdentityService<U> {
    users: Arc<U>,
}

impl<U> IdentityService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> IdentityQuery for IdentityService<U>
where
    U: UserRepository,
{
    async fn current_identity(&self, actor: Option<UserId>) -> Result<IdentityPayload, Error> {
        let actor = actor.ok_or_else(|| Error::unauthorized("login required"))?;
        let user = self
            .users
            .find_by_id(&actor)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        Ok(IdentityPayload::from(&user))
    }
}

/// Authenticates email/password pairs against stored password hashes.
#[derive(Clone)]
pub struct CredentialLoginService<U> {
    users: Arc<U>,
}

impl<U> CredentialLoginService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> LoginService for CredentialLoginService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        match user {
            Some(user) if user.password().verify(credentials.password()) => {
                info!(user_id = %user.id(), "login succeeded");
                Ok(*user.id())
            }
            _ => {
                warn!("login rejected");
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockUserRepository, UserPersistenceError};
    use crate::domain::{DisplayName, Email, ErrorCode, PasswordHash, Role, User};
    use rstest::{fixture, rstest};

    #[fixture]
    fn ada() -> User {
        User::new(
            UserId::random(),
            Email::new("ada@example.com").expect("valid email"),
            DisplayName::new("Ada").expect("valid name"),
            PasswordHash::derive("analytical").expect("hash"),
        )
    }

    fn repo_with(user: Option<User>) -> MockUserRepository {
        let mut repo = MockUserRepository::new();
        let by_id = user.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(by_id.clone()));
        repo.expect_find_by_email()
            .returning(move |_| Ok(user.clone()));
        repo
    }

    #[rstest]
    #[tokio::test]
    async fn identity_describes_bound_actor(ada: User) {
        let id = *ada.id();
        let service = IdentityService::new(Arc::new(repo_with(Some(ada))));

        let identity = service
            .current_identity(Some(id))
            .await
            .expect("identity resolves");

        assert_eq!(identity.id, id);
        assert_eq!(identity.email.as_str(), "ada@example.com");
        assert_eq!(identity.name, "Ada");
        assert_eq!(identity.roles, vec![Role::User]);
    }

    #[rstest]
    #[tokio::test]
    async fn identity_without_actor_is_unauthorized() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().times(0);
        let service = IdentityService::new(Arc::new(repo));

        let error = service.current_identity(None).await.expect_err("no actor");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn identity_for_vanished_user_is_unauthorized() {
        let service = IdentityService::new(Arc::new(repo_with(None)));

        let error = service
            .current_identity(Some(UserId::random()))
            .await
            .expect_err("user gone");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn login_accepts_matching_password(ada: User) {
        let id = *ada.id();
        let service = CredentialLoginService::new(Arc::new(repo_with(Some(ada))));
        let creds = LoginCredentials::try_from_parts("ADA@example.com", "analytical")
            .expect("credentials shape");

        assert_eq!(service.authenticate(&creds).await.expect("login"), id);
    }

    #[rstest]
    #[case(true, "wrong")]
    #[case(false, "analytical")]
    #[tokio::test]
    async fn login_rejects_bad_password_or_unknown_email(
        ada: User,
        #[case] known: bool,
        #[case] password: &str,
    ) {
        let service = CredentialLoginService::new(Arc::new(repo_with(known.then_some(ada))));
        let creds =
            LoginCredentials::try_from_parts("ada@example.com", password).expect("shape");

        let error = service.authenticate(&creds).await.expect_err("rejected");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "invalid credentials");
    }

    #[rstest]
    #[tokio::test]
    async fn login_maps_connection_failures() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .return_once(|_| Err(UserPersistenceError::connection("refused")));
        let service = CredentialLoginService::new(Arc::new(repo));
        let creds = LoginCredentials::try_from_parts("ada@example.com", "pw").expect("shape");

        let error = service.authenticate(&creds).await.expect_err("db down");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
