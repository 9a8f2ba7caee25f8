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

//! API to create a new driver profile.

use crate::driver::FleetDriver;
use crate::model::{DriverStatus, License};
use crate::rest::{ApiResponse, DriverBody, get_bearer_auth};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Json, http};
use fleet_core::rest::RestError;
use serde::Deserialize;
use uuid::Uuid;

/// Message sent by a client to create a driver profile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateDriverRequest {
    /// Identifier of the user account the profile belongs to.
    pub(crate) user_id: Uuid,

    /// Full name of the driver.
    pub(crate) name: String,

    /// License number of the driver.
    pub(crate) license: String,

    /// Status of the driver.  Defaults to pending.
    pub(crate) status: Option<DriverStatus>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    headers: HeaderMap,
    Json(request): Json<CreateDriverRequest>,
) -> Result<(http::StatusCode, impl IntoResponse), RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;
    let license = License::new(request.license)?;

    let driver = driver
        .create_driver(token, request.user_id, request.name, license, request.status)
        .await?;

    Ok((http::StatusCode::CREATED, Json(ApiResponse::new(DriverBody::from(driver)))))
}
