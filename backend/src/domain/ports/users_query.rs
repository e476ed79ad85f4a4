//! Driving port for directory reads.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for looking up and listing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch a user by id.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// All users holding the doctor role.
    async fn list_doctors(&self) -> Result<Vec<User>, Error>;

    /// All users holding the patient role.
    async fn list_patients(&self) -> Result<Vec<User>, Error>;
}

/// Fixture implementation for handler tests that never resolve users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUsersQuery;

#[async_trait]
impl UsersQuery for FixtureUsersQuery {
    async fn get_user(&self, _id: &UserId) -> Result<Option<User>, Error> {
        Ok(None)
    }

    async fn list_doctors(&self) -> Result<Vec<User>, Error> {
        Ok(Vec::new())
    }

    async fn list_patients(&self) -> Result<Vec<User>, Error> {
        Ok(Vec::new())
    }
}
