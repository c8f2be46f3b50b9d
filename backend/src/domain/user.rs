//! User identity model.
//!
//! A user carries login credentials, a role set, and read-only views of the
//! tickets it owns or is assigned to. The ticket sets are the inverse side of
//! the ticket's owner and assignee references; they are kept in step by the
//! link helpers in [`crate::domain::ticket`] and rebuilt by repositories on
//! load.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{
    self, PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::TicketId;

/// Maximum stored length of an email address.
pub const EMAIL_MAX: usize = 180;
/// Maximum length of a display name.
pub const DISPLAY_NAME_MAX: usize = 100;

const SALT_LEN: usize = 16;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong { max: usize },
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("stored password hash is malformed")]
    MalformedPasswordHash,
    #[error("password hashing failed: {message}")]
    PasswordHashing { message: String },
    #[error("unknown role: {value}")]
    UnknownRole { value: String },
}

/// Stable user identifier stored as a UUID.
///
/// # Examples
/// ```
/// use ticket_desk::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its canonical string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised email address used as the login identity.
///
/// ## Invariants
/// - Trimmed and lower-cased.
/// - Exactly one `@` with non-empty local and domain parts, no whitespace.
/// - At most [`EMAIL_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada@example.com")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let mut parts = normalised.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Ada Lovelace")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(display_name))
    }

    /// Borrow the display name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Argon2id password hash stored as a PHC string
/// (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).
///
/// The raw password is never stored. Verification reads the cost parameters
/// from the stored string, so hashes stay valid when the defaults change.
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Derive a fresh hash for `password` using a random salt.
    pub fn derive(password: &str) -> Result<Self, UserValidationError> {
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(hashing_failed)?;
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(hashing_failed)?;
        Ok(Self(phc.to_string()))
    }

    /// Accept a previously stored hash after checking it is an Argon2id PHC
    /// string.
    pub fn from_stored(stored: impl Into<String>) -> Result<Self, UserValidationError> {
        let stored = stored.into();
        parse_stored(&stored).ok_or(UserValidationError::MalformedPasswordHash)?;
        Ok(Self(stored))
    }

    /// Check a candidate password against the stored hash.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        parse_stored(&self.0).is_some_and(|phc| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &phc)
                .is_ok()
        })
    }

    /// Encoded representation for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

fn hashing_failed(err: password_hash::Error) -> UserValidationError {
    UserValidationError::PasswordHashing {
        message: err.to_string(),
    }
}

fn parse_stored(stored: &str) -> Option<PhcString<'_>> {
    let phc = PhcString::new(stored).ok()?;
    (phc.algorithm == Algorithm::Argon2id.ident() && phc.hash.is_some()).then_some(phc)
}

/// Coarse role granted to a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Role {
    /// Baseline role every user holds.
    #[serde(rename = "ROLE_USER")]
    User,
    /// Administrative role granted through the admin tooling.
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    /// Stable storage and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ROLE_USER" => Ok(Self::User),
            "ROLE_ADMIN" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Application user.
///
/// # Examples
/// ```
/// use ticket_desk::domain::{DisplayName, Email, PasswordHash, Role, User, UserId};
///
/// let user = User::new(
///     UserId::random(),
///     Email::new("Ada@Example.com").unwrap(),
///     DisplayName::new("Ada").unwrap(),
///     PasswordHash::derive("s3cret").unwrap(),
/// );
/// assert_eq!(user.email().as_str(), "ada@example.com");
/// assert!(user.roles().contains(&Role::User));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    display_name: DisplayName,
    password: PasswordHash,
    roles: BTreeSet<Role>,
    owned_tickets: BTreeSet<TicketId>,
    assigned_tickets: BTreeSet<TicketId>,
}

impl User {
    /// Build a user with no explicit roles and no tickets.
    pub fn new(
        id: UserId,
        email: Email,
        display_name: DisplayName,
        password: PasswordHash,
    ) -> Self {
        Self {
            id,
            email,
            display_name,
            password,
            roles: BTreeSet::new(),
            owned_tickets: BTreeSet::new(),
            assigned_tickets: BTreeSet::new(),
        }
    }

    /// Replace the explicitly granted roles.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Replace the derived ticket views, typically when loading from storage.
    #[must_use]
    pub fn with_ticket_sets(
        mut self,
        owned: impl IntoIterator<Item = TicketId>,
        assigned: impl IntoIterator<Item = TicketId>,
    ) -> Self {
        self.owned_tickets = owned.into_iter().collect();
        self.assigned_tickets = assigned.into_iter().collect();
        self
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Effective roles. [`Role::User`] is always present.
    pub fn roles(&self) -> BTreeSet<Role> {
        let mut roles = self.roles.clone();
        roles.insert(Role::User);
        roles
    }

    /// Roles as explicitly granted, without the implicit baseline.
    pub fn granted_roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    /// Grant an additional role.
    pub fn grant(&mut self, role: Role) {
        self.roles.insert(role);
    }

    /// Replace the password hash.
    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
    }

    /// Rename the user.
    pub fn set_display_name(&mut self, display_name: DisplayName) {
        self.display_name = display_name;
    }

    pub fn owned_tickets(&self) -> &BTreeSet<TicketId> {
        &self.owned_tickets
    }

    pub fn assigned_tickets(&self) -> &BTreeSet<TicketId> {
        &self.assigned_tickets
    }

    pub(crate) fn attach_owned(&mut self, ticket: TicketId) {
        self.owned_tickets.insert(ticket);
    }

    pub(crate) fn attach_assigned(&mut self, ticket: TicketId) {
        self.assigned_tickets.insert(ticket);
    }

    pub(crate) fn detach_owned(&mut self, ticket: &TicketId) {
        self.owned_tickets.remove(ticket);
    }

    pub(crate) fn detach_assigned(&mut self, ticket: &TicketId) {
        self.assigned_tickets.remove(ticket);
    }
}
