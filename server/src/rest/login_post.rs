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

//! API to create a new session for an existing user.

use crate::driver::FleetDriver;
use crate::model::{AccessToken, Password};
use crate::rest::ApiResponse;
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use fleet_core::model::EmailAddress;
use fleet_core::rest::RestError;
use serde::{Deserialize, Serialize};

/// Message sent by a client to start a session.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    /// Email of the account to log into.
    pub(crate) email: String,

    /// Password of the account.
    pub(crate) password: Password,
}

/// Message returned by the server after a successful login attempt.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    /// Access token for this session.
    pub(crate) access_token: AccessToken,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, RestError> {
    let email = EmailAddress::new(request.email)?;

    let session = driver.login(email, request.password).await?;
    let response = LoginResponse { access_token: session.take_access_token() };

    Ok(Json(ApiResponse::new(response)))
}
