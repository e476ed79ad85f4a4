//! End-to-end reservation behaviour over in-memory adapters.
//!
//! These tests drive the real coordinator against the in-memory lock store
//! and hand-rolled in-memory repositories, covering the properties that
//! matter under concurrency: a single winner per slot, conflict detection
//! for overlapping starts, and lock self-healing after a crashed holder.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use backend::domain::ports::{
    BookingCommand, BookingQuery, BookingRepository, BookingRepositoryError, ProfileUpdate,
    ReserveRequest, SlotLockStore, UserRepository, UserRepositoryError,
};
use backend::domain::{
    Booking, BookingCommandService, BookingQueryService, BookingStatus, Email, ErrorCode,
    NewBooking, PasswordDigest, Profile, Role, TimeSlot, User, UserId,
};
use backend::outbound::lock::MemorySlotLockStore;

#[derive(Default)]
struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|user| (user.id(), user)).collect()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.users.lock().expect("user table lock").get(id).cloned())
    }

    async fn find_with_credentials(
        &self,
        _email: &Email,
    ) -> Result<Option<(User, PasswordDigest)>, UserRepositoryError> {
        Ok(None)
    }

    async fn insert(
        &self,
        user: &User,
        _digest: &PasswordDigest,
    ) -> Result<(), UserRepositoryError> {
        self.users
            .lock()
            .expect("user table lock")
            .insert(user.id(), user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        _id: &UserId,
        _update: &ProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self
            .users
            .lock()
            .expect("user table lock")
            .values()
            .filter(|user| user.role() == role)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct InMemoryBookingRepository {
    bookings: Mutex<Vec<Booking>>,
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_overlapping(
        &self,
        doctor_id: &UserId,
        slot: &TimeSlot,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self
            .bookings
            .lock()
            .expect("booking table lock")
            .iter()
            .find(|booking| {
                booking.doctor_id() == *doctor_id
                    && booking.is_active()
                    && booking.slot().overlaps(slot)
            })
            .cloned())
    }

    async fn insert(&self, booking: &NewBooking) -> Result<Booking, BookingRepositoryError> {
        let mut bookings = self.bookings.lock().expect("booking table lock");
        // The partial unique index on (doctor_id, slot_start, active).
        if bookings.iter().any(|existing| {
            existing.doctor_id() == booking.doctor_id
                && existing.is_active()
                && existing.slot().start() == booking.slot.start()
        }) {
            return Err(BookingRepositoryError::DuplicateSlot);
        }

        let stored = Booking::from_parts(
            Uuid::new_v4(),
            booking.doctor_id,
            booking.patient_id,
            booking.slot,
            BookingStatus::Active,
            Utc::now(),
        );
        bookings.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(self
            .bookings
            .lock()
            .expect("booking table lock")
            .iter()
            .filter(|booking| booking.doctor_id() == *doctor_id)
            .cloned()
            .collect())
    }

    async fn list_for_patient(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        Ok(self
            .bookings
            .lock()
            .expect("booking table lock")
            .iter()
            .filter(|booking| booking.patient_id() == *patient_id)
            .cloned()
            .collect())
    }
}

fn make_user(role: Role, name: &str) -> User {
    User::new(
        UserId::random(),
        Email::new(format!("{}@example.org", Uuid::new_v4())).expect("valid email"),
        role,
        name,
        Profile::default(),
    )
    .expect("valid user")
}

type TestService =
    BookingCommandService<MemorySlotLockStore, InMemoryBookingRepository, InMemoryUserRepository>;

struct Harness {
    service: Arc<TestService>,
    query: BookingQueryService<InMemoryBookingRepository>,
    locks: Arc<MemorySlotLockStore>,
    doctor: User,
    patient: User,
}

fn harness() -> Harness {
    let doctor = make_user(Role::Doctor, "Dr Fixture");
    let patient = make_user(Role::Patient, "Pat Fixture");
    let locks = Arc::new(MemorySlotLockStore::new());
    let bookings = Arc::new(InMemoryBookingRepository::default());
    let users = Arc::new(InMemoryUserRepository::with_users([
        doctor.clone(),
        patient.clone(),
    ]));

    Harness {
        service: Arc::new(BookingCommandService::new(
            Arc::clone(&locks),
            Arc::clone(&bookings),
            users,
            Arc::new(mockable::DefaultClock),
        )),
        query: BookingQueryService::new(bookings),
        locks,
        doctor,
        patient,
    }
}

fn tomorrow_at(hour: u32, minute: u32) -> DateTime<Utc> {
    (Utc::now() + chrono::Duration::days(1))
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .expect("valid wall-clock time")
        .and_utc()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_requests_for_one_slot_admit_exactly_one_booking() {
    let harness = harness();
    let slot_start = tomorrow_at(9, 0);

    let attempts = (0..16)
        .map(|_| {
            let service = Arc::clone(&harness.service);
            let request = ReserveRequest {
                doctor_id: harness.doctor.id(),
                requested_by: harness.patient.clone(),
                slot_start,
            };
            tokio::spawn(async move { service.reserve(request).await })
        })
        .collect::<Vec<_>>();

    let mut successes = 0;
    for attempt in attempts {
        match attempt.await.expect("task completes") {
            Ok(booking) => {
                successes += 1;
                assert!(booking.is_active());
                assert_eq!(booking.slot().start(), slot_start);
            }
            Err(error) => assert!(
                matches!(
                    error.code(),
                    ErrorCode::SlotContended | ErrorCode::SlotConflict
                ),
                "unexpected failure: {error:?}"
            ),
        }
    }
    assert_eq!(successes, 1, "exactly one request may win the slot");

    let listed = harness
        .query
        .my_bookings(&harness.doctor)
        .await
        .expect("doctor listing succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].slot().start(), slot_start);
}

#[tokio::test]
async fn overlapping_starts_are_caught_by_the_durable_check_not_the_lock() {
    let harness = harness();

    let first = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start: tomorrow_at(9, 0),
    };
    harness
        .service
        .reserve(first)
        .await
        .expect("first reservation succeeds");

    // Distinct lock key, overlapping interval: only the overlap query can
    // reject this one.
    let half_past = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start: tomorrow_at(9, 30),
    };
    let error = harness
        .service
        .reserve(half_past)
        .await
        .expect_err("overlapping start must conflict");
    assert_eq!(error.code(), ErrorCode::SlotConflict);

    // Boundary touch at 10:00 does not overlap the 09:00 hour.
    let next_hour = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start: tomorrow_at(10, 0),
    };
    harness
        .service
        .reserve(next_hour)
        .await
        .expect("adjacent slot books cleanly");
}

#[tokio::test]
async fn crashed_holder_blocks_the_slot_only_until_the_ttl_lapses() {
    let harness = harness();
    let slot_start = tomorrow_at(11, 0);
    let slot = TimeSlot::starting_at(slot_start);
    let key = slot.lock_key(&harness.doctor.id());
    let ttl = Duration::from_millis(80);

    // Simulate a holder that died after acquiring and never released.
    assert!(
        harness
            .locks
            .try_acquire(&key, ttl)
            .await
            .expect("manual acquire")
    );

    let blocked = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start,
    };
    let error = harness
        .service
        .reserve(blocked)
        .await
        .expect_err("held key must contend");
    assert_eq!(error.code(), ErrorCode::SlotContended);

    tokio::time::sleep(ttl + Duration::from_millis(30)).await;

    let retried = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start,
    };
    harness
        .service
        .reserve(retried)
        .await
        .expect("expired key self-heals");
}

#[tokio::test]
async fn reservations_for_unknown_doctors_are_rejected() {
    let harness = harness();

    let request = ReserveRequest {
        doctor_id: UserId::random(),
        requested_by: harness.patient.clone(),
        slot_start: tomorrow_at(9, 0),
    };
    let error = harness
        .service
        .reserve(request)
        .await
        .expect_err("unknown doctor");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn doctors_cannot_book_their_own_or_other_calendars() {
    let harness = harness();

    let request = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.doctor.clone(),
        slot_start: tomorrow_at(9, 0),
    };
    let error = harness
        .service
        .reserve(request)
        .await
        .expect_err("doctor as requester");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn past_slots_are_rejected() {
    let harness = harness();

    let request = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start: Utc::now() - chrono::Duration::seconds(1),
    };
    let error = harness
        .service
        .reserve(request)
        .await
        .expect_err("past slot");
    assert_eq!(error.code(), ErrorCode::PastTime);
}

#[tokio::test]
async fn listing_is_idempotent_between_writes() {
    let harness = harness();

    let request = ReserveRequest {
        doctor_id: harness.doctor.id(),
        requested_by: harness.patient.clone(),
        slot_start: tomorrow_at(14, 0),
    };
    harness
        .service
        .reserve(request)
        .await
        .expect("reservation succeeds");

    let first = harness
        .query
        .my_bookings(&harness.patient)
        .await
        .expect("first read");
    let second = harness
        .query
        .my_bookings(&harness.patient)
        .await
        .expect("second read");

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}
