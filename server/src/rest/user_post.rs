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

//! API to create a new user account.

use crate::driver::FleetDriver;
use crate::model::{Password, Role};
use crate::rest::{ApiResponse, UserBody, get_bearer_auth};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Json, http};
use fleet_core::model::EmailAddress;
use fleet_core::rest::RestError;
use serde::Deserialize;

/// Message sent by a client to create a user.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateUserRequest {
    /// Email of the new account.
    pub(crate) email: String,

    /// Password of the new account.
    pub(crate) password: Password,

    /// Role of the new account.  Defaults to the unprivileged driver role.
    pub(crate) role: Option<Role>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Result<(http::StatusCode, impl IntoResponse), RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;
    let email = EmailAddress::new(request.email)?;

    let user = driver.create_user(token, email, request.password, request.role).await?;

    Ok((http::StatusCode::CREATED, Json(ApiResponse::new(UserBody::from(user)))))
}
