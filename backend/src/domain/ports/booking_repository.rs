//! Driven port for durable booking persistence and the overlap query.

use async_trait::async_trait;

use crate::domain::{Booking, NewBooking, TimeSlot, UserId};

/// Errors raised by booking repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingRepositoryError {
    /// Repository connection could not be established.
    #[error("booking repository connection failed: {message}")]
    Connection {
        /// Adapter-level description of the failure.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("booking repository query failed: {message}")]
    Query {
        /// Adapter-level description of the failure.
        message: String,
    },
    /// The active-slot uniqueness constraint rejected the insert.
    ///
    /// Defense-in-depth behind the slot lock: reachable only if a second
    /// writer slipped past the lock for the identical slot key.
    #[error("an active booking already holds this slot")]
    DuplicateSlot,
}

impl BookingRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for writing and listing bookings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find an active booking for `doctor_id` whose interval overlaps
    /// `slot`, evaluated against committed state at call time.
    async fn find_overlapping(
        &self,
        doctor_id: &UserId,
        slot: &TimeSlot,
    ) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Persist a new active booking, assigning it a unique id.
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, BookingRepositoryError>;

    /// All bookings on a doctor's calendar.
    async fn list_for_doctor(
        &self,
        doctor_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// All bookings made by a patient.
    async fn list_for_patient(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError>;
}
