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

//! API to modify one user account.

use crate::driver::FleetDriver;
use crate::model::{Password, Role};
use crate::rest::{ApiResponse, UserBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::model::EmailAddress;
use fleet_core::rest::RestError;
use serde::Deserialize;
use uuid::Uuid;

/// Message sent by a client to modify a user.  Missing fields keep their current values.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateUserRequest {
    /// New email for the account.
    pub(crate) email: Option<String>,

    /// New password for the account.
    pub(crate) password: Option<Password>,

    /// New role for the account.
    pub(crate) role: Option<Role>,
}

/// PATCH handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;
    let email = request.email.map(EmailAddress::new).transpose()?;

    let user = driver.update_user(token, id, email, request.password, request.role).await?;

    Ok(Json(ApiResponse::new(UserBody::from(user))))
}
