//! PostgreSQL-backed `BookingRepository` implementation using Diesel.
//!
//! The overlap query runs against committed state at call time; with fixed
//! one-hour slots, an active booking overlaps the candidate slot exactly
//! when its start lies inside `(candidate.start - 1h, candidate.end)`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{BookingRepository, BookingRepositoryError};
use crate::domain::{Booking, BookingStatus, NewBooking, TimeSlot, UserId};

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{BookingRow, NewBookingRow};
use super::pool::{DbPool, PoolError};
use super::schema::bookings;

/// Diesel-backed implementation of the booking repository port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> BookingRepositoryError {
    map_pool_error(error, BookingRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> BookingRepositoryError {
    map_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// Convert a database row into a domain booking.
fn row_to_booking(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    let BookingRow {
        id,
        doctor_id,
        patient_id,
        slot_start,
        status,
        created_at,
    } = row;

    let status = BookingStatus::parse(&status)
        .ok_or_else(|| BookingRepositoryError::query(format!("unknown booking status: {status}")))?;

    Ok(Booking::from_parts(
        id,
        UserId::from_uuid(doctor_id),
        UserId::from_uuid(patient_id),
        TimeSlot::starting_at(slot_start),
        status,
        created_at,
    ))
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn find_overlapping(
        &self,
        doctor_id: &UserId,
        slot: &TimeSlot,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = bookings::table
            .filter(bookings::doctor_id.eq(doctor_id.as_uuid()))
            .filter(bookings::status.eq(BookingStatus::Active.as_str()))
            .filter(bookings::slot_start.lt(slot.end()))
            .filter(bookings::slot_start.gt(slot.start() - TimeSlot::duration()))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_booking).transpose()
    }

    async fn insert(&self, booking: &NewBooking) -> Result<Booking, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = NewBookingRow {
            id: Uuid::new_v4(),
            doctor_id: *booking.doctor_id.as_uuid(),
            patient_id: *booking.patient_id.as_uuid(),
            slot_start: booking.slot.start(),
            status: BookingStatus::Active.as_str().to_owned(),
        };

        let inserted = diesel::insert_into(bookings::table)
            .values(&row)
            .returning(BookingRow::as_returning())
            .get_result::<BookingRow>(&mut conn)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    BookingRepositoryError::DuplicateSlot
                } else {
                    map_diesel(error)
                }
            })?;

        row_to_booking(inserted)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::doctor_id.eq(doctor_id.as_uuid()))
            .order(bookings::slot_start.asc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_booking).collect()
    }

    async fn list_for_patient(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::patient_id.eq(patient_id.as_uuid()))
            .order(bookings::slot_start.asc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_booking).collect()
    }
}
