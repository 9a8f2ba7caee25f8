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

//! The `Driver` data type and its license.

use derive_getters::Getters;
use fleet_core::model::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Number of digits in a driver's license.
const LICENSE_LENGTH: usize = 11;

/// Minimum length of a driver's name in characters.
const MIN_NAME_LENGTH: usize = 3;

/// Maximum length of a driver's name in characters.
const MAX_NAME_LENGTH: usize = 100;

/// Status of a driver within the fleet.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    /// The driver was registered but has not been cleared to drive yet.
    Pending,

    /// The driver can be assigned to trucks and freights.
    Active,

    /// The driver is not working at the moment.
    Inactive,

    /// The driver was barred from driving.
    Suspended,
}

impl DriverStatus {
    /// Returns the textual representation of the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Pending => "pending",
            DriverStatus::Active => "active",
            DriverStatus::Inactive => "inactive",
            DriverStatus::Suspended => "suspended",
        }
    }

    /// Parses a status from its textual representation.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "pending" => Ok(DriverStatus::Pending),
            "active" => Ok(DriverStatus::Active),
            "inactive" => Ok(DriverStatus::Inactive),
            "suspended" => Ok(DriverStatus::Suspended),
            s => Err(ModelError(format!("Unknown driver status '{}'", s))),
        }
    }
}

/// Represents a valid driver's license number.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct License(String);

impl License {
    /// Creates a new license from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.len() != LICENSE_LENGTH || !s.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ModelError(format!(
                "License must be exactly {} digits",
                LICENSE_LENGTH
            )));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the license.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validates a driver's name, which must be `MIN_NAME_LENGTH` to `MAX_NAME_LENGTH` characters
/// of letters and spaces.
pub(crate) fn validate_name(name: &str) -> ModelResult<()> {
    let count = name.chars().count();
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&count) {
        return Err(ModelError(format!(
            "Name must be {} to {} characters long",
            MIN_NAME_LENGTH, MAX_NAME_LENGTH
        )));
    }
    if !name.chars().all(|ch| ch.is_alphabetic() || ch == ' ') {
        return Err(ModelError("Name can only contain letters and spaces".to_owned()));
    }
    Ok(())
}

/// Representation of a driver.
#[derive(Clone, Debug, Getters, PartialEq)]
pub struct Driver {
    /// Identifier of the driver.
    id: Uuid,

    /// Identifier of the user account this driver is bound to.  At most one driver may exist
    /// per user.
    user_id: Uuid,

    /// Full name of the driver.
    name: String,

    /// License number of the driver, which must be unique across all drivers.
    license: License,

    /// Current status of the driver.
    status: DriverStatus,

    /// Time the driver was created at.
    created_at: OffsetDateTime,

    /// Time the driver was last modified at.
    updated_at: OffsetDateTime,
}

impl Driver {
    /// Creates a new driver with a fresh identifier, validating the name.
    pub(crate) fn new(
        user_id: Uuid,
        name: String,
        license: License,
        status: DriverStatus,
        now: OffsetDateTime,
    ) -> ModelResult<Self> {
        validate_name(&name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            license,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Recreates a driver from its persisted parts.
    pub(crate) fn from_parts(
        id: Uuid,
        user_id: Uuid,
        name: String,
        license: License,
        status: DriverStatus,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, user_id, name, license, status, created_at, updated_at }
    }

    /// Builds the updated version of this driver by applying the given changes and stamping
    /// `now` as the modification time.
    pub(crate) fn apply(
        self,
        name: Option<String>,
        license: Option<License>,
        status: Option<DriverStatus>,
        now: OffsetDateTime,
    ) -> ModelResult<Self> {
        let name = name.unwrap_or(self.name);
        validate_name(&name)?;
        Ok(Self {
            id: self.id,
            user_id: self.user_id,
            name,
            license: license.unwrap_or(self.license),
            status: status.unwrap_or(self.status),
            created_at: self.created_at,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_driverstatus_as_str_parse() {
        for status in [
            DriverStatus::Pending,
            DriverStatus::Active,
            DriverStatus::Inactive,
            DriverStatus::Suspended,
        ] {
            assert_eq!(status, DriverStatus::parse(status.as_str()).unwrap());
        }
        DriverStatus::parse("retired").unwrap_err();
        DriverStatus::parse("ACTIVE").unwrap_err();
    }

    #[test]
    fn test_license_ok() {
        assert_eq!("11122233344", License::new("11122233344").unwrap().as_str());
        assert_eq!("00000000000", License::new("00000000000").unwrap().as_str());
    }

    #[test]
    fn test_license_error() {
        License::new("").unwrap_err();
        License::new("1112223334").unwrap_err();
        License::new("111222333444").unwrap_err();
        License::new("1112223334a").unwrap_err();
        License::new("111-2223334").unwrap_err();
    }

    #[test]
    fn test_validate_name() {
        validate_name("Ana").unwrap();
        validate_name("Jose Maria dos Santos").unwrap();
        validate_name("João Conceição").unwrap();
        validate_name(&"a".repeat(100)).unwrap();

        validate_name("").unwrap_err();
        validate_name("Jo").unwrap_err();
        validate_name(&"a".repeat(101)).unwrap_err();
        validate_name("R2 D2").unwrap_err();
        validate_name("Ana-Maria").unwrap_err();
    }

    #[test]
    fn test_driver_apply_revalidates_name() {
        let now = datetime!(2023-06-01 10:00:00 UTC);
        let driver = Driver::new(
            Uuid::new_v4(),
            "Ana Souza".to_owned(),
            License::new("11122233344").unwrap(),
            DriverStatus::Pending,
            now,
        )
        .unwrap();

        driver.clone().apply(Some("x".to_owned()), None, None, now).unwrap_err();

        let later = datetime!(2023-06-02 12:00:00 UTC);
        let updated =
            driver.clone().apply(None, None, Some(DriverStatus::Active), later).unwrap();
        assert_eq!(driver.id(), updated.id());
        assert_eq!("Ana Souza", updated.name());
        assert_eq!(&DriverStatus::Active, updated.status());
        assert_eq!(&now, updated.created_at());
        assert_eq!(&later, updated.updated_at());
    }
}
