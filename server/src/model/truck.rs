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

//! The `Truck` data type and its plate.

use derive_getters::Getters;
use fleet_core::model::{ModelError, ModelResult};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Minimum length of a truck model name in characters.
const MIN_MODEL_LENGTH: usize = 3;

/// Maximum length of a truck model name in characters.
const MAX_MODEL_LENGTH: usize = 100;

/// Earliest manufacturing year we accept.
const MIN_YEAR: i16 = 1900;

/// Latest manufacturing year we accept.
const MAX_YEAR: i16 = 2030;

/// Represents a valid truck plate in canonical `AAA-0000` form.
///
/// Plates may be supplied in any letter case and with or without the separating hyphen; the
/// uppercase hyphenated form is the canonical one and the one that gets persisted, so lookups
/// against stored plates are exact and `abc1234` collides with `ABC-1234`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Plate(String);

impl Plate {
    /// Creates a new plate from an untrusted string `s`, making sure it is valid and
    /// normalizing it to its canonical form.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into().to_ascii_uppercase();

        let bytes = s.as_bytes();
        let valid = match bytes.len() {
            7 => {
                bytes[0..3].iter().all(|b| b.is_ascii_uppercase())
                    && bytes[3..7].iter().all(|b| b.is_ascii_digit())
            }
            8 => {
                bytes[0..3].iter().all(|b| b.is_ascii_uppercase())
                    && bytes[3] == b'-'
                    && bytes[4..8].iter().all(|b| b.is_ascii_digit())
            }
            _ => false,
        };
        if !valid {
            return Err(ModelError(format!("Invalid plate '{}'; must match AAA-0000", s)));
        }

        if bytes.len() == 7 {
            Ok(Self(format!("{}-{}", &s[0..3], &s[3..7])))
        } else {
            Ok(Self(s))
        }
    }

    /// Returns a string view of the plate in its canonical form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validates a truck model name, which must be `MIN_MODEL_LENGTH` to `MAX_MODEL_LENGTH`
/// characters of letters, digits, spaces, hyphens and dots.
pub(crate) fn validate_model(model: &str) -> ModelResult<()> {
    let count = model.chars().count();
    if !(MIN_MODEL_LENGTH..=MAX_MODEL_LENGTH).contains(&count) {
        return Err(ModelError(format!(
            "Model must be {} to {} characters long",
            MIN_MODEL_LENGTH, MAX_MODEL_LENGTH
        )));
    }
    if !model.chars().all(|ch| ch.is_alphanumeric() || ch == ' ' || ch == '-' || ch == '.') {
        return Err(ModelError(
            "Model can only contain letters, digits, spaces, hyphens and dots".to_owned(),
        ));
    }
    Ok(())
}

/// Validates a truck manufacturing year.
pub(crate) fn validate_year(year: i16) -> ModelResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ModelError(format!("Year must be between {} and {}", MIN_YEAR, MAX_YEAR)));
    }
    Ok(())
}

/// Representation of a truck.
#[derive(Clone, Debug, Getters, PartialEq)]
pub struct Truck {
    /// Identifier of the truck.
    id: Uuid,

    /// Plate of the truck, which must be unique across all trucks.
    plate: Plate,

    /// Model name of the truck.
    model: String,

    /// Manufacturing year of the truck, if known.
    year: Option<i16>,

    /// Identifier of the driver currently assigned to the truck, if any.  A driver can be
    /// assigned to at most one truck at a time.
    driver_id: Option<Uuid>,

    /// Time the truck was created at.
    created_at: OffsetDateTime,

    /// Time the truck was last modified at.
    updated_at: OffsetDateTime,
}

impl Truck {
    /// Creates a new truck with a fresh identifier, validating the model and year.
    pub(crate) fn new(
        plate: Plate,
        model: String,
        year: Option<i16>,
        driver_id: Option<Uuid>,
        now: OffsetDateTime,
    ) -> ModelResult<Self> {
        validate_model(&model)?;
        if let Some(year) = year {
            validate_year(year)?;
        }
        Ok(Self {
            id: Uuid::new_v4(),
            plate,
            model,
            year,
            driver_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Recreates a truck from its persisted parts.
    pub(crate) fn from_parts(
        id: Uuid,
        plate: Plate,
        model: String,
        year: Option<i16>,
        driver_id: Option<Uuid>,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, plate, model, year, driver_id, created_at, updated_at }
    }

    /// Builds the updated version of this truck by applying the given changes and stamping
    /// `now` as the modification time.
    ///
    /// The `driver_id` change is doubly-wrapped because the field itself is optional: a missing
    /// outer value keeps the current assignment while `Some(None)` clears it.
    pub(crate) fn apply(
        self,
        plate: Option<Plate>,
        model: Option<String>,
        year: Option<i16>,
        driver_id: Option<Option<Uuid>>,
        now: OffsetDateTime,
    ) -> ModelResult<Self> {
        let model = model.unwrap_or(self.model);
        validate_model(&model)?;
        let year = match year {
            Some(year) => {
                validate_year(year)?;
                Some(year)
            }
            None => self.year,
        };
        Ok(Self {
            id: self.id,
            plate: plate.unwrap_or(self.plate),
            model,
            year,
            driver_id: driver_id.unwrap_or(self.driver_id),
            created_at: self.created_at,
            updated_at: now,
        })
    }
}
