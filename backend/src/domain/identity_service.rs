//! Identity domain services: login, registration, directory, profile.
//!
//! These adapters around the user store have no concurrency concerns; the
//! only uniqueness they rely on (email) is enforced by the store itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    LoginCredentials, LoginService, ProfileCommand, ProfileUpdate, RegistrationRequest,
    RegistrationService, UserRepository, UserRepositoryError, UsersQuery,
};
use crate::domain::{Email, Error, PasswordDigest, Profile, Role, User, UserId};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => {
            Error::conflict("this email is already registered")
        }
    }
}

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

fn validate_password(password: &str) -> Result<(), Error> {
    let issue = if password.chars().count() < 8 {
        Some("password must be at least 8 characters")
    } else if !password.chars().any(char::is_uppercase) {
        Some("password must contain an uppercase letter")
    } else if !password.chars().any(char::is_lowercase) {
        Some("password must contain a lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("password must contain a digit")
    } else if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        Some("password must contain a special character")
    } else {
        None
    };

    issue.map_or(Ok(()), |message| Err(Error::invalid_request(message)))
}

/// Identity service implementing login, registration, and profile ports.
#[derive(Clone)]
pub struct IdentityService<R> {
    users: Arc<R>,
}

impl<R> IdentityService<R> {
    /// Create an identity service over the user repository.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> LoginService for IdentityService<R>
where
    R: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        // A malformed email cannot match an account; collapse it into the
        // same response as a wrong password so probes learn nothing.
        let email = Email::new(credentials.email())
            .map_err(|_| Error::unauthorized("invalid email or password"))?;

        let found = self
            .users
            .find_with_credentials(&email)
            .await
            .map_err(map_repository_error)?;

        match found {
            Some((user, digest)) if digest.verify(credentials.password()) => Ok(user),
            _ => Err(Error::unauthorized("invalid email or password")),
        }
    }
}

#[async_trait]
impl<R> RegistrationService for IdentityService<R>
where
    R: UserRepository,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        let email = Email::new(request.email.as_str())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        validate_password(&request.password)?;

        let user = User::new(
            UserId::random(),
            email,
            Role::Patient,
            request.full_name.as_str(),
            Profile::default(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        let digest = PasswordDigest::create(&request.password);

        self.users
            .insert(&user, &digest)
            .await
            .map_err(map_repository_error)?;

        Ok(user)
    }
}

#[async_trait]
impl<R> ProfileCommand for IdentityService<R>
where
    R: UserRepository,
{
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        if let Some(full_name) = &update.full_name {
            let length = full_name.trim().chars().count();
            if !(2..=100).contains(&length) {
                return Err(Error::invalid_request(
                    "full name must be between 2 and 100 characters",
                ));
            }
        }

        self.users
            .update_profile(id, &update)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

/// Directory service implementing the users query port.
#[derive(Clone)]
pub struct DirectoryService<R> {
    users: Arc<R>,
}

impl<R> DirectoryService<R> {
    /// Create a directory service over the user repository.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<R> UsersQuery for DirectoryService<R>
where
    R: UserRepository,
{
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)
    }

    async fn list_doctors(&self) -> Result<Vec<User>, Error> {
        self.users
            .list_by_role(Role::Doctor)
            .await
            .map_err(map_repository_error)
    }

    async fn list_patients(&self) -> Result<Vec<User>, Error> {
        self.users
            .list_by_role(Role::Patient)
            .await
            .map_err(map_repository_error)
    }
}
