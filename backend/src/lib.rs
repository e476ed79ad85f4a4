//! Appointment booking backend.
//!
//! Books fixed one-hour slots for doctors against patients with a
//! no-double-booking guarantee that holds across horizontally scaled
//! instances: a short-lived distributed lock per (doctor, slot start) key
//! composed with a durable overlap check. See [`domain::booking_service`]
//! for the reservation protocol.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
