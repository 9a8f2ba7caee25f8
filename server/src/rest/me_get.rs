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

//! API to query the session that a token belongs to.

use crate::driver::FleetDriver;
use crate::model::Role;
use crate::rest::{ApiResponse, get_bearer_auth};
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::{EmptyBody, RestError};
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Message returned by the server to describe the calling session.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeResponse {
    /// Identifier of the user that owns the session.
    pub(crate) user_id: Uuid,

    /// Role of the user that owns the session.
    pub(crate) role: Role,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;

    let whoami = driver.current_user(token).await?;
    let response = MeResponse { user_id: *whoami.id(), role: *whoami.role() };

    Ok(Json(ApiResponse::new(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AccessToken;
    use crate::rest::testutils::*;
    use axum::http;
    use fleet_core::rest::testutils::OneShotBuilder;
    use fleet_core::test_payload_must_be_empty;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/auth/me".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let user = context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<MeResponse>>()
            .await;
        assert_eq!(user.id(), &response.data.user_id);
        assert_eq!(user.role(), &response.data.role);
    }

    #[tokio::test]
    async fn test_bad_token() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(AccessToken::generate().as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("Invalid session")
            .await;
    }

    #[tokio::test]
    async fn test_expired_session() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        context.advance_clock_hours(25);

        OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNAUTHORIZED)
            .expect_error("expired")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
