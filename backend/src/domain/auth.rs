//! Login credentials accepted by the authentication port.
//!
//! Handlers build credentials from raw strings here so services only ever
//! see a normalised email and a non-empty password.

use zeroize::Zeroizing;

use crate::domain::{Email, UserValidationError};

/// Reasons a login payload is rejected before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Email was blank or malformed.
    #[error("email is invalid: {0}")]
    InvalidEmail(UserValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased by [`Email::new`].
/// - `password` is non-empty and kept verbatim, including whitespace. It is
///   zeroed when dropped.
///
/// # Examples
/// ```
/// use ticket_desk::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "pw").unwrap();
/// assert_eq!(creds.email().as_str(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case("   ", "pw")]
    #[case("not-an-email", "pw")]
    fn invalid_emails_are_rejected(#[case] email: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid email must fail");
        assert!(matches!(err, LoginValidationError::InvalidEmail(_)));
    }

    #[rstest]
    fn empty_password_is_rejected() {
        assert_eq!(
            LoginCredentials::try_from_parts("ada@example.com", "")
                .expect_err("empty password must fail"),
            LoginValidationError::EmptyPassword
        );
    }

    #[rstest]
    #[case("  ADA@example.com  ", " padded secret ")]
    #[case("bob@example.com", "correct horse battery staple")]
    fn valid_credentials_normalise_email_only(#[case] email: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(email, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.email().as_str(), email.trim().to_lowercase());
        assert_eq!(creds.password(), password);
    }
}
