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

//! The `User` data type and its role.

use crate::model::HashedPassword;
use derive_getters::Getters;
use fleet_core::model::{EmailAddress, ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role of a user, which determines what operations it can perform.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrators can mutate every entity.
    Admin,

    /// Drivers (and any other non-administrators) get read access and user management only.
    Driver,
}

impl Role {
    /// Returns the textual representation of the role as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Driver => "driver",
        }
    }

    /// Parses a role from its textual representation.
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "driver" => Ok(Role::Driver),
            s => Err(ModelError(format!("Unknown role '{}'", s))),
        }
    }
}

/// Representation of a user account.
#[derive(Clone, Debug, Getters, PartialEq)]
pub struct User {
    /// Identifier of the user.
    id: Uuid,

    /// Email of the user, which must be unique across all users.
    email: EmailAddress,

    /// Hashed password of the user.
    password: HashedPassword,

    /// Role of the user.
    role: Role,

    /// Time the user was created at.
    created_at: OffsetDateTime,

    /// Time the user was last modified at.
    updated_at: OffsetDateTime,
}

impl User {
    /// Creates a new user with a fresh identifier.
    pub(crate) fn new(
        email: EmailAddress,
        password: HashedPassword,
        role: Role,
        now: OffsetDateTime,
    ) -> Self {
        Self { id: Uuid::new_v4(), email, password, role, created_at: now, updated_at: now }
    }

    /// Recreates a user from its persisted parts.
    pub(crate) fn from_parts(
        id: Uuid,
        email: EmailAddress,
        password: HashedPassword,
        role: Role,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self { id, email, password, role, created_at, updated_at }
    }

    /// Builds the updated version of this user by applying the given changes and stamping
    /// `now` as the modification time.
    pub(crate) fn apply(
        self,
        email: Option<EmailAddress>,
        password: Option<HashedPassword>,
        role: Option<Role>,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id: self.id,
            email: email.unwrap_or(self.email),
            password: password.unwrap_or(self.password),
            role: role.unwrap_or(self.role),
            created_at: self.created_at,
            updated_at: now,
        }
    }
}
