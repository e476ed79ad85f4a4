//! Authentication HTTP handlers.
//!
//! ```text
//! POST /api/v1/auth/register
//! POST /api/v1/auth/login
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{LoginCredentials, RegistrationRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, require_current_user};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponseBody;

/// Request payload for registering a patient account.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password; digested before storage.
    pub password: String,
    /// Display name.
    pub full_name: String,
}

/// Request payload for logging in.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    /// Account email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Register a new patient account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 201, description = "Account created", body = UserResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequestBody>,
) -> ApiResult<HttpResponse> {
    let RegisterRequestBody {
        email,
        password,
        full_name,
    } = payload.into_inner();

    let user = state
        .registration
        .register(RegistrationRequest {
            email,
            password,
            full_name,
        })
        .await?;

    Ok(HttpResponse::Created().json(UserResponseBody::from(user)))
}

/// Verify credentials and persist the user id in the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Logged in", body = UserResponseBody),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<UserResponseBody>> {
    let LoginRequestBody { email, password } = payload.into_inner();
    let credentials = LoginCredentials::new(email, password);

    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(user.id())?;

    Ok(web::Json(UserResponseBody::from(user)))
}

/// Drop the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session dropped")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security(("SessionCookie" = []))
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Return the authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponseBody),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me",
    security(("SessionCookie" = []))
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponseBody>> {
    let user = require_current_user(&state, &session).await?;
    Ok(web::Json(UserResponseBody::from(user)))
}
