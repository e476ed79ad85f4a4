//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ProfileUpdate, UserRepository, UserRepositoryError};
use crate::domain::{Email, PasswordDigest, Profile, Role, User, UserId};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let UserRow {
        id,
        email,
        password_digest: _,
        password_salt: _,
        role,
        full_name,
        phone,
        age,
        gender,
        department,
        medical_history,
        allergies,
        created_at: _,
    } = row;

    let email = Email::new(email).map_err(|err| UserRepositoryError::query(err.to_string()))?;
    let role = Role::parse(&role).map_err(|err| UserRepositoryError::query(err.to_string()))?;
    User::new(
        UserId::from_uuid(id),
        email,
        role,
        full_name,
        Profile {
            phone,
            age,
            gender,
            department,
            medical_history,
            allergies,
        },
    )
    .map_err(|err| UserRepositoryError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn find_with_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, PasswordDigest)>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(|row| {
            let digest = PasswordDigest::from_parts(
                row.password_salt.clone(),
                row.password_digest.clone(),
            );
            row_to_user(row).map(|user| (user, digest))
        })
        .transpose()
    }

    async fn insert(
        &self,
        user: &User,
        digest: &PasswordDigest,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let profile = user.profile();
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_str(),
            password_digest: digest.digest_hex(),
            password_salt: digest.salt_hex(),
            role: user.role().as_str(),
            full_name: user.full_name(),
            phone: profile.phone.as_deref(),
            age: profile.age,
            gender: profile.gender.as_deref(),
            department: profile.department.as_deref(),
            medical_history: profile.medical_history.as_deref(),
            allergies: profile.allergies.as_deref(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                if is_unique_violation(&error) {
                    UserRepositoryError::DuplicateEmail
                } else {
                    map_diesel(error)
                }
            })
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let changes = UserProfileChangeset {
            full_name: update.full_name.clone(),
            phone: update.profile.phone.clone(),
            age: update.profile.age,
            gender: update.profile.gender.clone(),
            department: update.profile.department.clone(),
            medical_history: update.profile.medical_history.clone(),
            allergies: update.profile.allergies.clone(),
        };

        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(role.as_str()))
            .order(users::full_name.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_user).collect()
    }
}
