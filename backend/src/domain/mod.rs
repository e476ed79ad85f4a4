//! Domain entities, value objects, and services.
//!
//! The booking invariant (no two overlapping active bookings per doctor)
//! lives entirely in this layer: [`booking_service`] coordinates the slot
//! lock and the durable overlap check behind the [`ports`] boundary, and
//! inbound adapters only ever talk to driving ports.

pub mod booking;
pub mod booking_service;
pub mod error;
pub mod identity_service;
pub mod ports;
pub mod slot;
pub mod trace_id;
pub mod user;

pub use self::booking::{Booking, BookingStatus, NewBooking};
pub use self::booking_service::{BookingCommandService, BookingQueryService, SLOT_LOCK_TTL};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::identity_service::{DirectoryService, IdentityService};
pub use self::slot::TimeSlot;
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, PasswordDigest, Profile, ProfileCompletion, Role, User, UserId, UserValidationError,
};

/// Convenient domain result alias.
pub type ApiResult<T> = Result<T, Error>;
