//! Booking aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{TimeSlot, UserId};

/// Lifecycle state of a booking.
///
/// Bookings move from [`Active`](Self::Active) to
/// [`Cancelled`](Self::Cancelled) only, and are never deleted once
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// The booking occupies its slot.
    Active,
    /// The booking has been cancelled and no longer blocks the slot.
    Cancelled,
}

impl BookingStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the storage representation back into a status.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Draft of a booking before the store has assigned an identity.
///
/// Only the reservation coordinator builds these, after the slot lock and
/// the overlap check have both passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    /// Doctor whose calendar the slot belongs to.
    pub doctor_id: UserId,
    /// Patient the slot is reserved for.
    pub patient_id: UserId,
    /// The reserved slot.
    pub slot: TimeSlot,
}

/// A persisted booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    id: Uuid,
    doctor_id: UserId,
    patient_id: UserId,
    slot: TimeSlot,
    status: BookingStatus,
    created_at: DateTime<Utc>,
}

impl Booking {
    /// Rehydrate a booking from stored fields.
    pub fn from_parts(
        id: Uuid,
        doctor_id: UserId,
        patient_id: UserId,
        slot: TimeSlot,
        status: BookingStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            doctor_id,
            patient_id,
            slot,
            status,
            created_at,
        }
    }

    /// Unique identifier assigned by the store.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Doctor whose calendar the slot belongs to.
    pub fn doctor_id(&self) -> UserId {
        self.doctor_id
    }

    /// Patient the slot is reserved for.
    pub fn patient_id(&self) -> UserId {
        self.patient_id
    }

    /// The reserved slot.
    pub fn slot(&self) -> TimeSlot {
        self.slot
    }

    /// Lifecycle state.
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether this booking currently blocks its slot.
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}
