//! Driving port for profile mutation.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

use super::ProfileUpdate;

/// Domain use-case port for updating the caller's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCommand: Send + Sync {
    /// Apply a partial profile update for the given user.
    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<User, Error>;
}
