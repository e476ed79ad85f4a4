//! Driving ports for booking use-cases.
//!
//! Inbound adapters call these without knowing the backing infrastructure,
//! which keeps HTTP handler tests deterministic behind test doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Booking, Error, User, UserId};

/// Request payload for reserving a slot.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    /// Doctor whose calendar the slot belongs to.
    pub doctor_id: UserId,
    /// The authenticated caller asking for the slot.
    pub requested_by: User,
    /// Requested slot start instant (UTC).
    pub slot_start: DateTime<Utc>,
}

/// Domain use-case port for creating bookings.
///
/// The implementation behind this port is the only component allowed to
/// create a booking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Reserve a slot for the requesting patient.
    async fn reserve(&self, request: ReserveRequest) -> Result<Booking, Error>;
}

/// Domain use-case port for reading bookings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Bookings visible to the caller: doctors see their calendar,
    /// patients see their own reservations.
    async fn my_bookings(&self, caller: &User) -> Result<Vec<Booking>, Error>;
}

/// Fixture implementation for handler tests that never reach bookings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookingQuery;

#[async_trait]
impl BookingQuery for FixtureBookingQuery {
    async fn my_bookings(&self, _caller: &User) -> Result<Vec<Booking>, Error> {
        Ok(Vec::new())
    }
}
