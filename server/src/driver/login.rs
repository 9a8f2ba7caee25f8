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

//! Extends the driver with the `login` and `current_user` methods.

use crate::db;
use crate::driver::FleetDriver;
use crate::model::{AccessToken, Password, Session, User};
use fleet_core::db::DbError;
use fleet_core::driver::{DriverError, DriverResult};
use fleet_core::model::EmailAddress;

impl FleetDriver {
    /// Logs a user in with `email` and `password`, creating a new session.
    ///
    /// Unknown accounts and bad passwords yield the same error so that callers cannot
    /// tell which addresses have an account.
    pub(crate) async fn login(
        self,
        email: EmailAddress,
        password: Password,
    ) -> DriverResult<Session> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let user = match db::get_user_by_email(tx.ex(), &email).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::Unauthorized("Invalid credentials".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if !user.password().verify(&password)? {
            return Err(DriverError::Unauthorized("Invalid credentials".to_owned()));
        }

        let session = Session::new(*user.id(), now);
        db::put_session(tx.ex(), &session).await?;

        tx.commit().await?;
        Ok(session)
    }

    /// Returns the user that owns the session identified by `token`.
    pub(crate) async fn current_user(self, token: AccessToken) -> DriverResult<User> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let whoami = self.authenticate(&mut tx, now, &token).await?;

        tx.commit().await?;
        Ok(whoami)
    }
}
