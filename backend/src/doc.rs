//! OpenAPI document assembled from handler annotations.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::domain::{BookingStatus, Error, ErrorCode, ProfileCompletion, Role};
use crate::inbound::http::auth::{LoginRequestBody, RegisterRequestBody};
use crate::inbound::http::bookings::{BookingResponseBody, CreateBookingRequestBody};
use crate::inbound::http::users::{UpdateProfileRequestBody, UserResponseBody};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Appointment Booking API",
        description = "Slot reservations for doctors with no-double-booking guarantees."
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::my_bookings,
        crate::inbound::http::doctors::list_doctors,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::profile_completion,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        BookingStatus,
        ProfileCompletion,
        RegisterRequestBody,
        LoginRequestBody,
        UserResponseBody,
        UpdateProfileRequestBody,
        CreateBookingRequestBody,
        BookingResponseBody,
    )),
    modifiers(&SessionCookieSecurity)
)]
pub struct ApiDoc;

/// Registers the session-cookie security scheme referenced by handlers.
struct SessionCookieSecurity;

impl utoipa::Modify for SessionCookieSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "SessionCookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("session"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use utoipa::OpenApi;

    use super::*;

    #[test]
    fn document_contains_the_booking_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        assert!(paths.contains_key("/api/v1/bookings"));
        assert!(paths.contains_key("/api/v1/bookings/my"));
        assert!(paths.contains_key("/api/v1/doctors"));
        assert!(paths.contains_key("/api/v1/auth/login"));
    }
}
