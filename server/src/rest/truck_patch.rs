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

//! API to modify one truck.

use crate::driver::FleetDriver;
use crate::model::Plate;
use crate::rest::{ApiResponse, TruckBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::RestError;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserializes a field that distinguishes between "absent" and "set to null".
fn deserialize_updatable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Message sent by a client to modify a truck.  Missing fields keep their current values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateTruckRequest {
    /// New plate for the truck.
    pub(crate) plate: Option<String>,

    /// New model name for the truck.
    pub(crate) model: Option<String>,

    /// New manufacturing year for the truck.
    pub(crate) year: Option<i16>,

    /// New driver assignment for the truck.  An explicit null unassigns the current driver,
    /// while leaving the field out keeps it.
    #[serde(default, deserialize_with = "deserialize_updatable")]
    pub(crate) driver_id: Option<Option<Uuid>>,
}

/// PATCH handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateTruckRequest>,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;
    let plate = request.plate.map(Plate::new).transpose()?;

    let truck = driver
        .update_truck(token, id, plate, request.model, request.year, request.driver_id)
        .await?;

    Ok(Json(ApiResponse::new(TruckBody::from(truck))))
}
