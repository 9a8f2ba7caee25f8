// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! API to query one user account.

use crate::driver::FleetDriver;
use crate::rest::{ApiResponse, UserBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::{EmptyBody, RestError};
use uuid::Uuid;

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;

    let user = driver.get_user(token, id).await?;

    Ok(Json(ApiResponse::new(UserBody::from(user))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use fleet_core::rest::testutils::OneShotBuilder;
    use fleet_core::test_payload_must_be_empty;

    fn route(id: Uuid) -> (http::Method, String) {
        (http::Method::GET, format!("/api/v1/users/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route(*user.id()))
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<UserBody>>()
            .await;
        assert_eq!(UserBody::from(user), response.data);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route(Uuid::new_v4()))
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User not found")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(Uuid::new_v4()));
}
