//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{HttpResponse, test, web};
use uuid::Uuid;

use crate::domain::ports::{
    FixtureBookingQuery, FixtureUsersQuery, MockBookingCommand, MockLoginService,
    MockProfileCommand, MockRegistrationService,
};
use crate::domain::{Email, Error, Profile, Role, User, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// State with inert ports; tests override the ones they exercise.
pub(crate) fn mock_state() -> HttpState {
    HttpState {
        login: Arc::new(MockLoginService::new()),
        registration: Arc::new(MockRegistrationService::new()),
        users: Arc::new(FixtureUsersQuery),
        profile: Arc::new(MockProfileCommand::new()),
        bookings: Arc::new(MockBookingCommand::new()),
        bookings_query: Arc::new(FixtureBookingQuery),
    }
}

/// A valid patient fixture with the given id.
pub(crate) fn patient_with_id(id: UserId) -> User {
    User::new(
        id,
        Email::new(format!("{}@example.org", Uuid::new_v4())).expect("valid email"),
        Role::Patient,
        "Fixture Patient",
        Profile::default(),
    )
    .expect("valid user")
}

/// A valid doctor fixture with the given id.
pub(crate) fn doctor_with_id(id: UserId) -> User {
    User::new(
        id,
        Email::new(format!("{}@clinic.example", Uuid::new_v4())).expect("valid email"),
        Role::Doctor,
        "Fixture Doctor",
        Profile::default(),
    )
    .expect("valid user")
}

/// Route that logs in an arbitrary user id, standing in for the real login
/// flow in handler tests.
pub(crate) fn login_route() -> actix_web::Resource {
    web::resource("/test-login/{id}").route(web::get().to(
        |session: SessionContext, path: web::Path<String>| async move {
            let id = UserId::parse(&path.into_inner())
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            session.persist_user(id)?;
            Ok::<_, Error>(HttpResponse::Ok())
        },
    ))
}

/// Log `user_id` in via [`login_route`] and return the session cookie.
pub(crate) async fn login<S, B>(app: &S, user_id: UserId) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/test-login/{user_id}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test login route failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
