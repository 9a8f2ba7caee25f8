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

//! API to delete one user account.

use crate::driver::FleetDriver;
use crate::rest::get_bearer_auth;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{http, response::IntoResponse};
use fleet_core::rest::{EmptyBody, RestError};
use uuid::Uuid;

/// DELETE handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;

    driver.delete_user(token, id).await?;

    Ok(http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::rest::testutils::*;
    use fleet_core::db::DbError;
    use fleet_core::rest::testutils::OneShotBuilder;
    use fleet_core::test_payload_must_be_empty;

    fn route(id: Uuid) -> (http::Method, String) {
        (http::Method::DELETE, format!("/api/v1/users/{}", id))
    }

    #[tokio::test]
    async fn test_ok_then_not_found() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let victim = context.create_test_user("bruno@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route(*victim.id()))
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::NO_CONTENT)
            .expect_empty()
            .await;
        match db::get_user(&mut context.ex().await, *victim.id()).await {
            Err(DbError::NotFound) => (),
            e => panic!("{:?}", e),
        }

        // Repeating the deletion reports the absence instead of being a silent no-op.
        OneShotBuilder::new(context.app(), route(*victim.id()))
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("User not found")
            .await;
    }

    #[tokio::test]
    async fn test_blocked_by_driver_profile() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        context.create_test_driver(&user, "Ana Souza", "11122233344").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route(*user.id()))
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_status(http::StatusCode::CONFLICT)
            .expect_error("driver profile")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route(Uuid::new_v4()));
}
