//! Doctor directory HTTP handlers.
//!
//! ```text
//! GET /api/v1/doctors
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponseBody;

/// List the bookable doctors. Publicly readable, like the rest of the
/// directory a patient needs before logging in.
#[utoipa::path(
    get,
    path = "/api/v1/doctors",
    responses(
        (status = 200, description = "Doctor directory", body = [UserResponseBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["doctors"],
    operation_id = "listDoctors",
    security([])
)]
#[get("/doctors")]
pub async fn list_doctors(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserResponseBody>>> {
    let doctors = state.users.list_doctors().await?;
    Ok(web::Json(
        doctors.into_iter().map(UserResponseBody::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    //! Handler coverage with mocked ports.

    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::Value;

    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::MockUsersQuery;
    use crate::inbound::http::test_utils::{doctor_with_id, mock_state, test_session_middleware};

    #[actix_web::test]
    async fn doctors_are_listed_without_authentication() {
        let mut users = MockUsersQuery::new();
        users
            .expect_list_doctors()
            .times(1)
            .returning(|| Ok(vec![doctor_with_id(UserId::random())]));

        let state = HttpState {
            users: Arc::new(users),
            ..mock_state()
        };
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(state))
                .service(list_doctors),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/doctors").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.as_array().expect("array body").len(), 1);
        assert_eq!(body[0]["role"], "doctor");
    }
}
