//! Shared HTTP adapter state.
//!
//! Handlers accept this via `actix_web::web::Data` so they only depend on
//! domain driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BookingCommand, BookingQuery, LoginService, ProfileCommand, RegistrationService, UsersQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication use-case.
    pub login: Arc<dyn LoginService>,
    /// Registration use-case.
    pub registration: Arc<dyn RegistrationService>,
    /// Directory reads.
    pub users: Arc<dyn UsersQuery>,
    /// Profile mutation.
    pub profile: Arc<dyn ProfileCommand>,
    /// Reservation coordinator.
    pub bookings: Arc<dyn BookingCommand>,
    /// Booking read models.
    pub bookings_query: Arc<dyn BookingQuery>,
}
