//! Booking HTTP handlers.
//!
//! ```text
//! POST /api/v1/bookings
//! GET  /api/v1/bookings/my
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ReserveRequest;
use crate::domain::{Booking, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, require_current_user};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_timestamp, parse_user_id};

/// Request payload for reserving a slot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequestBody {
    /// Doctor whose calendar the slot belongs to.
    #[schema(format = "uuid")]
    pub doctor_id: String,
    /// Requested slot start; inputs without an offset are read as UTC.
    #[schema(format = "date-time")]
    pub slot_start: String,
}

/// Booking payload returned by the booking endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponseBody {
    /// Booking identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Doctor whose calendar the slot belongs to.
    #[schema(format = "uuid")]
    pub doctor_id: String,
    /// Patient the slot is reserved for.
    #[schema(format = "uuid")]
    pub patient_id: String,
    /// Slot start instant.
    #[schema(format = "date-time")]
    pub slot_start: String,
    /// Exclusive slot end instant.
    #[schema(format = "date-time")]
    pub slot_end: String,
    /// Lifecycle state.
    pub status: crate::domain::BookingStatus,
    /// Creation timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Booking> for BookingResponseBody {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id().to_string(),
            doctor_id: booking.doctor_id().to_string(),
            patient_id: booking.patient_id().to_string(),
            slot_start: booking.slot().start().to_rfc3339(),
            slot_end: booking.slot().end().to_rfc3339(),
            status: booking.status(),
            created_at: booking.created_at().to_rfc3339(),
        }
    }
}

/// Reserve a one-hour slot on a doctor's calendar for the authenticated
/// patient.
///
/// Contention (`slot_contended`) is retryable after a short delay;
/// conflict (`slot_conflict`) is terminal for this slot.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = CreateBookingRequestBody,
    responses(
        (status = 201, description = "Booking created", body = BookingResponseBody),
        (status = 400, description = "Invalid request or past slot", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 403, description = "Caller is not a patient", body = Error),
        (status = 404, description = "Doctor not found", body = Error),
        (status = 409, description = "Slot contended or already booked", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "createBooking",
    security(("SessionCookie" = []))
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateBookingRequestBody>,
) -> ApiResult<HttpResponse> {
    let caller = require_current_user(&state, &session).await?;
    let payload = payload.into_inner();
    let doctor_id = parse_user_id(&payload.doctor_id, FieldName::new("doctorId"))?;
    let slot_start = parse_timestamp(&payload.slot_start, FieldName::new("slotStart"))?;

    let booking = state
        .bookings
        .reserve(ReserveRequest {
            doctor_id,
            requested_by: caller,
            slot_start,
        })
        .await?;

    Ok(HttpResponse::Created().json(BookingResponseBody::from(booking)))
}

/// List the authenticated caller's bookings: doctors see their calendar,
/// patients their reservations.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/my",
    responses(
        (status = 200, description = "Bookings for the caller", body = [BookingResponseBody]),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "myBookings",
    security(("SessionCookie" = []))
)]
#[get("/bookings/my")]
pub async fn my_bookings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<BookingResponseBody>>> {
    let caller = require_current_user(&state, &session).await?;

    let bookings = state.bookings_query.my_bookings(&caller).await?;
    Ok(web::Json(
        bookings.into_iter().map(BookingResponseBody::from).collect(),
    ))
}
