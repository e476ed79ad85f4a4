//! Domain ports and supporting types for the hexagonal boundary.

mod booking_command;
mod booking_repository;
mod login_service;
mod profile_command;
mod slot_lock;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use booking_command::{MockBookingCommand, MockBookingQuery};
pub use booking_command::{BookingCommand, BookingQuery, FixtureBookingQuery, ReserveRequest};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
pub use login_service::{LoginCredentials, LoginService, RegistrationRequest, RegistrationService};
#[cfg(test)]
pub use profile_command::MockProfileCommand;
pub use profile_command::ProfileCommand;
#[cfg(test)]
pub use slot_lock::MockSlotLockStore;
pub use slot_lock::{SlotLockError, SlotLockStore};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{ProfileUpdate, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{FixtureUsersQuery, UsersQuery};
