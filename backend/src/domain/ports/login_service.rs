//! Driving ports for authentication and registration use-cases.

use async_trait::async_trait;
use zeroize::Zeroize;

use crate::domain::{Error, User};

/// Login credentials as supplied by an inbound adapter.
///
/// The password is wiped from memory when the credentials are dropped.
#[derive(Debug)]
pub struct LoginCredentials {
    email: String,
    password: String,
}

impl LoginCredentials {
    /// Bundle raw credential parts.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Supplied email address, not yet normalised.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Supplied plaintext password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Drop for LoginCredentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Request payload for registering a new patient account.
#[derive(Debug)]
pub struct RegistrationRequest {
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password; digested before storage.
    pub password: String,
    /// Display name.
    pub full_name: String,
}

impl Drop for RegistrationRequest {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Domain use-case port for account registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create a new patient account.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;
}
