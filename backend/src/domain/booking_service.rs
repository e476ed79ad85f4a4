//! Booking domain services.
//!
//! [`BookingCommandService`] is the reservation coordinator: the only
//! component that creates bookings. It composes the slot lock with the
//! durable overlap check so that, for a fixed (doctor, slot start) key, at
//! most one request system-wide is between the conflict check and the
//! insert at any time. The lock alone is not sufficient: a request for an
//! overlapping-but-distinct start (say, thirty minutes into an existing
//! booking) never contends on the key and is caught only by the interval
//! query against committed state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BookingCommand, BookingQuery, BookingRepository, BookingRepositoryError, ReserveRequest,
    SlotLockError, SlotLockStore, UserRepository, UserRepositoryError,
};
use crate::domain::{Booking, Error, NewBooking, Role, TimeSlot, User};

/// How long an unreleased slot lock may outlive its holder.
///
/// Must exceed the expected duration of the conflict-check-plus-insert
/// sequence with a comfortable margin; it also bounds how long a crashed
/// holder can block its slot key.
pub const SLOT_LOCK_TTL: Duration = Duration::from_secs(10);

fn map_lock_error(error: SlotLockError) -> Error {
    match error {
        SlotLockError::Backend { message } => {
            Error::service_unavailable(format!("slot lock store unavailable: {message}"))
        }
    }
}

fn map_booking_repository_error(error: BookingRepositoryError) -> Error {
    match error {
        BookingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("booking store unavailable: {message}"))
        }
        BookingRepositoryError::Query { message } => {
            Error::internal(format!("booking store error: {message}"))
        }
        BookingRepositoryError::DuplicateSlot => {
            Error::slot_conflict("the doctor already has an active booking at this slot")
        }
    }
}

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => {
            Error::conflict("a user with this email already exists")
        }
    }
}

/// Reservation coordinator implementing the booking command port.
#[derive(Clone)]
pub struct BookingCommandService<L, B, U> {
    locks: Arc<L>,
    bookings: Arc<B>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    lock_ttl: Duration,
}

impl<L, B, U> BookingCommandService<L, B, U> {
    /// Create a coordinator with the default lock TTL.
    pub fn new(locks: Arc<L>, bookings: Arc<B>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            locks,
            bookings,
            users,
            clock,
            lock_ttl: SLOT_LOCK_TTL,
        }
    }

    /// Override the lock TTL.
    pub fn with_lock_ttl(mut self, lock_ttl: Duration) -> Self {
        self.lock_ttl = lock_ttl;
        self
    }
}

impl<L, B, U> BookingCommandService<L, B, U>
where
    L: SlotLockStore,
    B: BookingRepository,
    U: UserRepository,
{
    /// Steps performed while the slot lock is held: doctor resolution,
    /// overlap check, insert. The caller releases the lock on every exit
    /// path; TTL expiry covers a crash in here.
    async fn reserve_locked(
        &self,
        request: &ReserveRequest,
        slot: TimeSlot,
    ) -> Result<Booking, Error> {
        let doctor = self
            .users
            .find_by_id(&request.doctor_id)
            .await
            .map_err(map_user_repository_error)?
            .filter(|user| user.role() == Role::Doctor)
            .ok_or_else(|| Error::not_found("doctor not found"))?;

        if let Some(existing) = self
            .bookings
            .find_overlapping(&request.doctor_id, &slot)
            .await
            .map_err(map_booking_repository_error)?
        {
            debug!(
                doctor_id = %doctor.id(),
                existing_id = %existing.id(),
                "slot overlaps a committed booking"
            );
            return Err(Error::slot_conflict(
                "the doctor already has a booking that overlaps this slot",
            ));
        }

        let booking = self
            .bookings
            .insert(&NewBooking {
                doctor_id: request.doctor_id,
                patient_id: request.requested_by.id(),
                slot,
            })
            .await
            .map_err(map_booking_repository_error)?;

        info!(
            booking_id = %booking.id(),
            doctor_id = %booking.doctor_id(),
            slot_start = %booking.slot().start(),
            "booking created"
        );
        Ok(booking)
    }
}

#[async_trait]
impl<L, B, U> BookingCommand for BookingCommandService<L, B, U>
where
    L: SlotLockStore,
    B: BookingRepository,
    U: UserRepository,
{
    async fn reserve(&self, request: ReserveRequest) -> Result<Booking, Error> {
        let slot = TimeSlot::starting_at(request.slot_start);
        if slot.is_past(self.clock.utc()) {
            return Err(Error::past_time("slot start is in the past"));
        }

        match request.requested_by.role() {
            Role::Patient => {}
            Role::Doctor | Role::Admin => {
                return Err(Error::forbidden("only patients can book appointments"));
            }
        }

        let key = slot.lock_key(&request.doctor_id);
        let acquired = self
            .locks
            .try_acquire(&key, self.lock_ttl)
            .await
            .map_err(map_lock_error)?;
        if !acquired {
            debug!(%key, "slot lock contended");
            return Err(Error::slot_contended(
                "this slot is being processed by another request; retry shortly",
            ));
        }

        let outcome = self.reserve_locked(&request, slot).await;

        // Unconditional cleanup; a failed release falls back to TTL expiry.
        if let Err(error) = self.locks.release(&key).await {
            warn!(%key, %error, "slot lock release failed; key expires via TTL");
        }

        outcome
    }
}

/// Booking read-model service implementing the query port.
#[derive(Clone)]
pub struct BookingQueryService<B> {
    bookings: Arc<B>,
}

impl<B> BookingQueryService<B> {
    /// Create a query service over the booking repository.
    pub fn new(bookings: Arc<B>) -> Self {
        Self { bookings }
    }
}

#[async_trait]
impl<B> BookingQuery for BookingQueryService<B>
where
    B: BookingRepository,
{
    async fn my_bookings(&self, caller: &User) -> Result<Vec<Booking>, Error> {
        let listing = match caller.role() {
            Role::Doctor => self.bookings.list_for_doctor(&caller.id()).await,
            // Admins have no calendar of their own; they see any bookings
            // made in their name, which is normally none.
            Role::Patient | Role::Admin => self.bookings.list_for_patient(&caller.id()).await,
        };
        listing.map_err(map_booking_repository_error)
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
