//! PostgreSQL persistence adapters.

mod diesel_booking_repository;
mod diesel_user_repository;
mod error_mapping;
mod models;
pub mod pool;
pub mod schema;

use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply pending migrations over a synchronous connection.
///
/// Runs once at startup, before the async pool takes over.
pub fn run_pending_migrations(database_url: &str) -> Result<(), PoolError> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|err| PoolError::build(format!("migration connection failed: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| PoolError::build(format!("migrations failed: {err}")))?;
    Ok(())
}
