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

//! API to modify one driver profile.

use crate::driver::FleetDriver;
use crate::model::{DriverStatus, License};
use crate::rest::{ApiResponse, DriverBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::RestError;
use serde::Deserialize;
use uuid::Uuid;

/// Message sent by a client to modify a driver.  Missing fields keep their current values.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateDriverRequest {
    /// New full name for the driver.
    pub(crate) name: Option<String>,

    /// New license number for the driver.
    pub(crate) license: Option<String>,

    /// New status for the driver.
    pub(crate) status: Option<DriverStatus>,
}

/// PATCH handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;
    let license = request.license.map(License::new).transpose()?;

    let driver = driver.update_driver(token, id, request.name, license, request.status).await?;

    Ok(Json(ApiResponse::new(DriverBody::from(driver))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use fleet_core::rest::testutils::OneShotBuilder;
    use fleet_core::test_payload_must_be_json;

    fn route(id: Uuid) -> (http::Method, String) {
        (http::Method::PATCH, format!("/api/v1/drivers/{}", id))
    }

    #[tokio::test]
    async fn test_partial_update() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        let driver = context.create_test_driver(&user, "Ana Souza", "11122233344").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route(*driver.id()))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({ "status": "suspended" }))
            .await
            .expect_json::<ApiResponse<DriverBody>>()
            .await;
        assert_eq!("Ana Souza", response.data.name);
        assert_eq!(DriverStatus::Suspended, response.data.status);
    }

    #[tokio::test]
    async fn test_forbidden_for_non_admins() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        let driver = context.create_test_driver(&user, "Ana Souza", "11122233344").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route(*driver.id()))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({ "status": "active" }))
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Administrator privileges required")
            .await;
    }

    #[tokio::test]
    async fn test_bad_name() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        let driver = context.create_test_driver(&user, "Ana Souza", "11122233344").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route(*driver.id()))
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({ "name": "R2 D2" }))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Name")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route(Uuid::new_v4()));
}
