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

//! API to register a new truck.

use crate::driver::FleetDriver;
use crate::model::Plate;
use crate::rest::{ApiResponse, TruckBody, get_bearer_auth};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Json, http};
use fleet_core::rest::RestError;
use serde::Deserialize;
use uuid::Uuid;

/// Message sent by a client to register a truck.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateTruckRequest {
    /// Plate of the truck, with or without the separating hyphen.
    pub(crate) plate: String,

    /// Model name of the truck.
    pub(crate) model: String,

    /// Manufacturing year of the truck.
    pub(crate) year: Option<i16>,

    /// Identifier of the driver to assign to the truck right away.
    pub(crate) driver_id: Option<Uuid>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    headers: HeaderMap,
    Json(request): Json<CreateTruckRequest>,
) -> Result<(http::StatusCode, impl IntoResponse), RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;
    let plate = Plate::new(request.plate)?;

    let truck =
        driver.create_truck(token, plate, request.model, request.year, request.driver_id).await?;

    Ok((http::StatusCode::CREATED, Json(ApiResponse::new(TruckBody::from(truck)))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use fleet_core::rest::testutils::OneShotBuilder;
    use fleet_core::test_payload_must_be_json;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/api/v1/trucks".to_owned())
    }

    #[tokio::test]
    async fn test_ok_normalizes_plate() {
        let context = TestContext::setup().await;

        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({
                "plate": "abc1234", "model": "FH 540", "year": 2020,
            }))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<ApiResponse<TruckBody>>()
            .await;
        assert_eq!("ABC-1234", response.data.plate);
        assert_eq!(Some(2020), response.data.year);
        assert_eq!(None, response.data.driver_id);
    }

    #[tokio::test]
    async fn test_forbidden_for_non_admins() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({ "plate": "ABC-1234", "model": "FH 540" }))
            .await
            .expect_status(http::StatusCode::FORBIDDEN)
            .expect_error("Administrator privileges required")
            .await;
    }

    #[tokio::test]
    async fn test_duplicate_plate_in_either_form() {
        let context = TestContext::setup().await;

        context.create_test_truck("ABC-1234", "FH 540", None, None).await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        for plate in ["ABC-1234", "ABC1234", "abc1234"] {
            OneShotBuilder::new(context.app(), route())
                .with_bearer_auth(token.as_str())
                .send_json(serde_json::json!({ "plate": plate, "model": "Actros 2651" }))
                .await
                .expect_status(http::StatusCode::CONFLICT)
                .expect_error("Plate already in use")
                .await;
        }
    }

    #[tokio::test]
    async fn test_bad_plate_and_bad_year() {
        let context = TestContext::setup().await;

        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({ "plate": "AB-1234", "model": "FH 540" }))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid plate")
            .await;

        OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_json(serde_json::json!({
                "plate": "ABC-1234", "model": "FH 540", "year": 1899,
            }))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Year must be between")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}
