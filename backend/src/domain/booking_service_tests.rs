//! Behaviour coverage for the reservation coordinator.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    MockBookingRepository, MockSlotLockStore, MockUserRepository, ReserveRequest,
};
use crate::domain::{BookingStatus, Email, ErrorCode, Profile, UserId};

/// Deterministic clock pinned to the fixture instant.
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn user(role: Role) -> User {
    User::new(
        UserId::random(),
        Email::new(format!("{}@example.org", Uuid::new_v4())).expect("valid email"),
        role,
        "Test Person",
        Profile::default(),
    )
    .expect("valid user")
}

fn booking_for(request: &ReserveRequest) -> Booking {
    Booking::from_parts(
        Uuid::new_v4(),
        request.doctor_id,
        request.requested_by.id(),
        TimeSlot::starting_at(request.slot_start),
        BookingStatus::Active,
        fixture_now(),
    )
}

#[fixture]
fn request() -> ReserveRequest {
    ReserveRequest {
        doctor_id: UserId::random(),
        requested_by: user(Role::Patient),
        slot_start: fixture_now() + chrono::Duration::hours(1),
    }
}

fn service(
    locks: MockSlotLockStore,
    bookings: MockBookingRepository,
    users: MockUserRepository,
) -> BookingCommandService<MockSlotLockStore, MockBookingRepository, MockUserRepository> {
    BookingCommandService::new(
        Arc::new(locks),
        Arc::new(bookings),
        Arc::new(users),
        Arc::new(FixedClock(fixture_now())),
    )
}

fn lock_granting(key: String) -> MockSlotLockStore {
    let mut locks = MockSlotLockStore::new();
    let acquire_key = key.clone();
    locks
        .expect_try_acquire()
        .withf(move |candidate, ttl| candidate == acquire_key && *ttl == SLOT_LOCK_TTL)
        .times(1)
        .returning(|_, _| Ok(true));
    locks
        .expect_release()
        .withf(move |candidate| candidate == key)
        .times(1)
        .returning(|_| Ok(()));
    locks
}

fn users_resolving(doctor_id: UserId, doctor: Option<User>) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .withf(move |id| *id == doctor_id)
        .returning(move |_| Ok(doctor.clone()));
    users
}

fn doctor_with_id(id: UserId) -> User {
    User::new(
        id,
        Email::new(format!("{}@clinic.example", Uuid::new_v4())).expect("valid email"),
        Role::Doctor,
        "Doc Fixture",
        Profile::default(),
    )
    .expect("valid user")
}

#[rstest]
#[tokio::test]
async fn reserve_creates_booking_when_slot_is_free(request: ReserveRequest) {
    let slot = TimeSlot::starting_at(request.slot_start);
    let locks = lock_granting(slot.lock_key(&request.doctor_id));
    let users = users_resolving(request.doctor_id, Some(doctor_with_id(request.doctor_id)));

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_overlapping()
        .times(1)
        .returning(|_, _| Ok(None));
    let created = booking_for(&request);
    let created_clone = created.clone();
    bookings
        .expect_insert()
        .times(1)
        .returning(move |_| Ok(created_clone.clone()));

    let result = service(locks, bookings, users).reserve(request).await;

    let booking = result.expect("reservation succeeds");
    assert_eq!(booking.id(), created.id());
    assert!(booking.is_active());
}

#[rstest]
#[tokio::test]
async fn past_slot_is_rejected_before_any_lock_traffic() {
    let request = ReserveRequest {
        doctor_id: UserId::random(),
        requested_by: user(Role::Patient),
        slot_start: fixture_now() - chrono::Duration::seconds(1),
    };

    // No expectations: any lock or store call panics the test.
    let result = service(
        MockSlotLockStore::new(),
        MockBookingRepository::new(),
        MockUserRepository::new(),
    )
    .reserve(request)
    .await;

    assert_eq!(result.expect_err("past slot").code(), ErrorCode::PastTime);
}

#[rstest]
#[tokio::test]
async fn slot_starting_at_now_passes_the_past_check(request: ReserveRequest) {
    let request = ReserveRequest {
        slot_start: fixture_now(),
        ..request
    };
    let slot = TimeSlot::starting_at(request.slot_start);
    let locks = lock_granting(slot.lock_key(&request.doctor_id));
    let users = users_resolving(request.doctor_id, Some(doctor_with_id(request.doctor_id)));

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_overlapping()
        .returning(|_, _| Ok(None));
    let created = booking_for(&request);
    bookings
        .expect_insert()
        .returning(move |_| Ok(created.clone()));

    let result = service(locks, bookings, users).reserve(request).await;
    assert!(result.is_ok());
}

#[rstest]
#[case::doctor(Role::Doctor)]
#[case::admin(Role::Admin)]
#[tokio::test]
async fn non_patient_callers_are_forbidden(request: ReserveRequest, #[case] role: Role) {
    let request = ReserveRequest {
        requested_by: user(role),
        ..request
    };

    let result = service(
        MockSlotLockStore::new(),
        MockBookingRepository::new(),
        MockUserRepository::new(),
    )
    .reserve(request)
    .await;

    assert_eq!(result.expect_err("forbidden").code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn contended_lock_short_circuits_without_store_reads(request: ReserveRequest) {
    let mut locks = MockSlotLockStore::new();
    locks.expect_try_acquire().returning(|_, _| Ok(false));
    // Losing the race must not release the winner's lock.

    let result = service(locks, MockBookingRepository::new(), MockUserRepository::new())
        .reserve(request)
        .await;

    assert_eq!(
        result.expect_err("contended").code(),
        ErrorCode::SlotContended
    );
}

#[rstest]
#[tokio::test]
async fn unreachable_lock_store_is_never_reported_as_acquired(request: ReserveRequest) {
    let mut locks = MockSlotLockStore::new();
    locks
        .expect_try_acquire()
        .returning(|_, _| Err(SlotLockError::backend("connection refused")));

    let result = service(locks, MockBookingRepository::new(), MockUserRepository::new())
        .reserve(request)
        .await;

    let error = result.expect_err("infrastructure failure");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert!(error.message().contains("connection refused"));
}

#[rstest]
#[tokio::test]
async fn unknown_doctor_reports_not_found_and_releases_the_lock(request: ReserveRequest) {
    let slot = TimeSlot::starting_at(request.slot_start);
    let locks = lock_granting(slot.lock_key(&request.doctor_id));
    let users = users_resolving(request.doctor_id, None);

    let result = service(locks, MockBookingRepository::new(), users)
        .reserve(request)
        .await;

    assert_eq!(result.expect_err("not found").code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn patient_id_in_the_doctor_position_reports_not_found(request: ReserveRequest) {
    let slot = TimeSlot::starting_at(request.slot_start);
    let locks = lock_granting(slot.lock_key(&request.doctor_id));
    let impostor = User::new(
        request.doctor_id,
        Email::new("not-a-doctor@example.org").expect("valid email"),
        Role::Patient,
        "Not A Doctor",
        Profile::default(),
    )
    .expect("valid user");
    let users = users_resolving(request.doctor_id, Some(impostor));

    let result = service(locks, MockBookingRepository::new(), users)
        .reserve(request)
        .await;

    assert_eq!(result.expect_err("not found").code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn overlapping_booking_reports_conflict_and_releases_the_lock(request: ReserveRequest) {
    let slot = TimeSlot::starting_at(request.slot_start);
    let locks = lock_granting(slot.lock_key(&request.doctor_id));
    let users = users_resolving(request.doctor_id, Some(doctor_with_id(request.doctor_id)));

    let existing = booking_for(&request);
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_overlapping()
        .returning(move |_, _| Ok(Some(existing.clone())));
    // No insert expectation: reaching it panics the test.

    let result = service(locks, bookings, users).reserve(request).await;

    assert_eq!(
        result.expect_err("conflict").code(),
        ErrorCode::SlotConflict
    );
}

#[rstest]
#[tokio::test]
async fn duplicate_slot_insert_maps_to_conflict(request: ReserveRequest) {
    let slot = TimeSlot::starting_at(request.slot_start);
    let locks = lock_granting(slot.lock_key(&request.doctor_id));
    let users = users_resolving(request.doctor_id, Some(doctor_with_id(request.doctor_id)));

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_overlapping()
        .returning(|_, _| Ok(None));
    bookings
        .expect_insert()
        .returning(|_| Err(BookingRepositoryError::DuplicateSlot));

    let result = service(locks, bookings, users).reserve(request).await;

    assert_eq!(
        result.expect_err("duplicate").code(),
        ErrorCode::SlotConflict
    );
}

#[rstest]
#[tokio::test]
async fn failed_release_does_not_fail_a_committed_reservation(request: ReserveRequest) {
    let slot = TimeSlot::starting_at(request.slot_start);
    let mut locks = MockSlotLockStore::new();
    let key = slot.lock_key(&request.doctor_id);
    locks
        .expect_try_acquire()
        .withf(move |candidate, _| candidate == key)
        .returning(|_, _| Ok(true));
    locks
        .expect_release()
        .times(1)
        .returning(|_| Err(SlotLockError::backend("connection reset")));
    let users = users_resolving(request.doctor_id, Some(doctor_with_id(request.doctor_id)));

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_overlapping()
        .returning(|_, _| Ok(None));
    let created = booking_for(&request);
    bookings
        .expect_insert()
        .returning(move |_| Ok(created.clone()));

    let result = service(locks, bookings, users).reserve(request).await;

    assert!(result.is_ok(), "TTL expiry covers the unreleased key");
}

#[rstest]
#[tokio::test]
async fn doctors_see_their_calendar_and_patients_their_reservations() {
    let doctor = user(Role::Doctor);
    let patient = user(Role::Patient);
    let doctor_id = doctor.id();
    let patient_id = patient.id();

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_list_for_doctor()
        .withf(move |id| *id == doctor_id)
        .times(1)
        .returning(|_| Ok(Vec::new()));
    bookings
        .expect_list_for_patient()
        .withf(move |id| *id == patient_id)
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let query = BookingQueryService::new(Arc::new(bookings));
    query
        .my_bookings(&doctor)
        .await
        .expect("doctor listing succeeds");
    query
        .my_bookings(&patient)
        .await
        .expect("patient listing succeeds");
}
