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

//! The `Freight` data type.
//!
//! Freights are persisted and their lifecycle is anchored in the schema, but the service does
//! not expose operations on them yet.  Deletion checks for drivers and trucks consult this
//! table so that entities referenced by a freight cannot disappear.

use derive_getters::Getters;
use fleet_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Status of a freight along its lifecycle.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightStatus {
    /// The freight was registered but has not left its origin.
    Created,

    /// The freight is on its way.
    InTransit,

    /// The freight reached its destination.
    Delivered,

    /// The freight was called off.
    Cancelled,
}

impl FreightStatus {
    /// Returns the textual representation of the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            FreightStatus::Created => "created",
            FreightStatus::InTransit => "in_transit",
            FreightStatus::Delivered => "delivered",
            FreightStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its textual representation.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "created" => Ok(FreightStatus::Created),
            "in_transit" => Ok(FreightStatus::InTransit),
            "delivered" => Ok(FreightStatus::Delivered),
            "cancelled" => Ok(FreightStatus::Cancelled),
            s => Err(ModelError(format!("Unknown freight status '{}'", s))),
        }
    }
}

/// Represents a non-negative freight price as an exact number of cents.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Creates a new price from a raw count of `cents`, making sure it is not negative.
    pub fn new(cents: i64) -> ModelResult<Self> {
        if cents < 0 {
            return Err(ModelError("Price cannot be negative".to_owned()));
        }
        Ok(Self(cents))
    }

    /// Returns the raw count of cents in this price.
    pub fn as_cents(&self) -> i64 {
        self.0
    }
}

/// Representation of a freight.
#[derive(Clone, Debug, Getters, PartialEq)]
pub struct Freight {
    /// Identifier of the freight.
    id: Uuid,

    /// Identifier of the driver in charge of the freight.
    driver_id: Uuid,

    /// Identifier of the truck carrying the freight.
    truck_id: Uuid,

    /// City or location the freight departs from.
    origin: String,

    /// City or location the freight must arrive to.
    destination: String,

    /// Current status of the freight.
    status: FreightStatus,

    /// Agreed price of the freight.
    price: Price,

    /// Time the freight was created at.
    created_at: OffsetDateTime,

    /// Time the freight was last modified at.
    updated_at: OffsetDateTime,
}

impl Freight {
    /// Recreates a freight from its persisted parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: Uuid,
        driver_id: Uuid,
        truck_id: Uuid,
        origin: String,
        destination: String,
        status: FreightStatus,
        price: Price,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, driver_id, truck_id, origin, destination, status, price, created_at, updated_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freightstatus_as_str_parse() {
        for status in [
            FreightStatus::Created,
            FreightStatus::InTransit,
            FreightStatus::Delivered,
            FreightStatus::Cancelled,
        ] {
            assert_eq!(status, FreightStatus::parse(status.as_str()).unwrap());
        }
        FreightStatus::parse("lost").unwrap_err();
        FreightStatus::parse("in-transit").unwrap_err();
    }

    #[test]
    fn test_price_bounds() {
        assert_eq!(0, Price::new(0).unwrap().as_cents());
        assert_eq!(150050, Price::new(150050).unwrap().as_cents());
        Price::new(-1).unwrap_err();
    }
}
