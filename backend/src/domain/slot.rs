//! Appointment slot value object.
//!
//! Every bookable slot has a fixed one-hour duration, so a slot is fully
//! described by its start instant. Overlap uses half-open `[start, end)`
//! semantics: two slots that merely touch at a boundary do not overlap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Fixed slot length in seconds.
const SLOT_SECONDS: i64 = 3_600;

/// A bookable appointment slot: a UTC start instant with an implicit
/// one-hour duration.
///
/// # Examples
/// ```
/// use backend::domain::TimeSlot;
/// use chrono::{TimeZone, Utc};
///
/// let nine = TimeSlot::starting_at(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap());
/// let half_past = TimeSlot::starting_at(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap());
/// assert!(nine.overlaps(&half_past));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlot {
    start: DateTime<Utc>,
}

impl TimeSlot {
    /// Construct a slot from its start instant.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start }
    }

    /// The fixed duration shared by every slot.
    pub fn duration() -> Duration {
        Duration::seconds(SLOT_SECONDS)
    }

    /// Start instant of the slot.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end instant of the slot.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Self::duration()
    }

    /// Whether two slots overlap under half-open interval semantics.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Whether the slot start lies before `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.start < now
    }

    /// Canonical mutual-exclusion key for this slot of one doctor's
    /// calendar. Keys are used for nothing besides slot locking.
    pub fn lock_key(&self, doctor_id: &UserId) -> String {
        format!("lock:{doctor_id}:{}", self.start.to_rfc3339())
    }
}
