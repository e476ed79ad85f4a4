//! User profile HTTP handlers.
//!
//! ```text
//! PUT /api/v1/users/profile
//! GET /api/v1/users/profile-completion
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ProfileUpdate;
use crate::domain::{Error, Profile, ProfileCompletion, Role, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::{SessionContext, require_current_user};
use crate::inbound::http::state::HttpState;

/// User payload returned by directory and profile endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseBody {
    /// User identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Normalised email address.
    pub email: String,
    /// Assigned role.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Contact phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    /// Free-form gender description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Department, for doctors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Medical history notes, for patients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    /// Known allergies, for patients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

impl From<User> for UserResponseBody {
    fn from(user: User) -> Self {
        let profile = user.profile().clone();
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            full_name: user.full_name().to_owned(),
            phone: profile.phone,
            age: profile.age,
            gender: profile.gender,
            department: profile.department,
            medical_history: profile.medical_history,
            allergies: profile.allergies,
        }
    }
}

/// Request payload for a partial profile update.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequestBody {
    /// Replacement display name.
    pub full_name: Option<String>,
    /// Replacement phone number.
    pub phone: Option<String>,
    /// Replacement age.
    pub age: Option<i32>,
    /// Replacement gender description.
    pub gender: Option<String>,
    /// Replacement department.
    pub department: Option<String>,
    /// Replacement medical history notes.
    pub medical_history: Option<String>,
    /// Replacement allergies.
    pub allergies: Option<String>,
}

impl UpdateProfileRequestBody {
    fn into_update(self) -> Result<ProfileUpdate, Error> {
        let Self {
            full_name,
            phone,
            age,
            gender,
            department,
            medical_history,
            allergies,
        } = self;

        let update = ProfileUpdate {
            full_name,
            profile: Profile {
                phone,
                age,
                gender,
                department,
                medical_history,
                allergies,
            },
        };
        if update == ProfileUpdate::default() {
            return Err(Error::invalid_request("no profile fields to update"));
        }
        Ok(update)
    }
}

/// Update the authenticated user's profile; omitted fields keep their
/// stored value.
#[utoipa::path(
    put,
    path = "/api/v1/users/profile",
    request_body = UpdateProfileRequestBody,
    responses(
        (status = 200, description = "Profile updated", body = UserResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile",
    security(("SessionCookie" = []))
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UpdateProfileRequestBody>,
) -> ApiResult<web::Json<UserResponseBody>> {
    let user_id = session.require_user_id()?;
    let update = payload.into_inner().into_update()?;

    let updated = state.profile.update_profile(&user_id, update).await?;
    Ok(web::Json(UserResponseBody::from(updated)))
}

/// Report how complete the authenticated user's profile is.
#[utoipa::path(
    get,
    path = "/api/v1/users/profile-completion",
    responses(
        (status = 200, description = "Completion summary", body = ProfileCompletion),
        (status = 401, description = "Unauthorized", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "profileCompletion",
    security(("SessionCookie" = []))
)]
#[get("/users/profile-completion")]
pub async fn profile_completion(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileCompletion>> {
    let user = require_current_user(&state, &session).await?;
    Ok(web::Json(user.profile_completion()))
}
