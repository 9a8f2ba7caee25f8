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

//! The `Session` data type.

use crate::model::AccessToken;
use derive_getters::Getters;
use time::OffsetDateTime;
use uuid::Uuid;

/// Representation of an active session for a logged-in user.
#[derive(Clone, Debug, Getters, PartialEq)]
pub struct Session {
    /// The token that identifies this session.
    access_token: AccessToken,

    /// Identifier of the user that owns this session.
    user_id: Uuid,

    /// Time the session was established at.
    login_time: OffsetDateTime,
}

impl Session {
    /// Creates a new session for `user_id` with a fresh access token.
    pub(crate) fn new(user_id: Uuid, login_time: OffsetDateTime) -> Self {
        Self { access_token: AccessToken::generate(), user_id, login_time }
    }

    /// Recreates a session from its persisted parts.
    pub(crate) fn from_parts(
        access_token: AccessToken,
        user_id: Uuid,
        login_time: OffsetDateTime,
    ) -> Self {
        Self { access_token, user_id, login_time }
    }

    /// Extracts the access token from the session, consuming it.
    pub(crate) fn take_access_token(self) -> AccessToken {
        self.access_token
    }
}
