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

//! Extends the driver with the user management operations.

use crate::db::{self, UserFilters};
use crate::driver::FleetDriver;
use crate::driver::authz::{self, Operation, Resource};
use crate::model::{
    AccessToken, OrderBy, Page, PageParams, Pagination, Password, Role, User, validate_search,
};
use fleet_core::db::DbError;
use fleet_core::driver::{DriverError, DriverResult};
use fleet_core::model::EmailAddress;
use uuid::Uuid;

/// Fields a listing of users may be ordered by.
pub(crate) const USER_ORDER_FIELDS: &[&str] = &["id", "email", "role", "createdAt", "updatedAt"];

impl FleetDriver {
    /// Creates a new user account with `email` and `password`.  The role defaults to the
    /// unprivileged driver role unless explicitly given.
    pub(crate) async fn create_user(
        self,
        token: AccessToken,
        email: EmailAddress,
        password: Password,
        role: Option<Role>,
    ) -> DriverResult<User> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Users, Operation::Create)?;

        match db::get_user_by_email(tx.ex(), &email).await {
            Ok(_) => return Err(DriverError::AlreadyExists("Email already in use".to_owned())),
            Err(DbError::NotFound) => (),
            Err(e) => return Err(e.into()),
        }

        let password = password.validate_and_hash()?;
        let user = User::new(email, password, role.unwrap_or(Role::Driver), now);
        db::create_user(tx.ex(), &user).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Gets the details of the user `id`.
    pub(crate) async fn get_user(self, token: AccessToken, id: Uuid) -> DriverResult<User> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Users, Operation::Read)?;

        let user = match db::get_user(tx.ex(), id).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("User not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(user)
    }

    /// Updates the user `id` with any of the given fields, leaving the others untouched.
    pub(crate) async fn update_user(
        self,
        token: AccessToken,
        id: Uuid,
        email: Option<EmailAddress>,
        password: Option<Password>,
        role: Option<Role>,
    ) -> DriverResult<User> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Users, Operation::Update)?;

        let user = match db::get_user(tx.ex(), id).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("User not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(email) = &email {
            match db::get_user_by_email(tx.ex(), email).await {
                Ok(other) if other.id() != user.id() => {
                    return Err(DriverError::AlreadyExists("Email already in use".to_owned()));
                }
                Ok(_) | Err(DbError::NotFound) => (),
                Err(e) => return Err(e.into()),
            }
        }

        let password = match password {
            Some(password) => Some(password.validate_and_hash()?),
            None => None,
        };

        let user = user.apply(email, password, role, now);
        db::update_user(tx.ex(), &user).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Deletes the user `id`, unless a driver profile is still bound to it.
    pub(crate) async fn delete_user(self, token: AccessToken, id: Uuid) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Users, Operation::Delete)?;

        match db::get_user(tx.ex(), id).await {
            Ok(_) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("User not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        if db::get_driver_by_user_id(tx.ex(), id).await?.is_some() {
            return Err(DriverError::AlreadyExists(
                "User still has a driver profile".to_owned(),
            ));
        }

        db::delete_user(tx.ex(), id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Lists the page of users selected by `filters`, `order` and `params`.
    pub(crate) async fn list_users(
        self,
        token: AccessToken,
        filters: UserFilters,
        order: OrderBy,
        params: PageParams,
    ) -> DriverResult<Page<User>> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Users, Operation::Read)?;

        if let Some(search) = &filters.search {
            validate_search(search)?;
        }

        let items = db::list_users(tx.ex(), &filters, &order, params).await?;
        let total = db::count_users(tx.ex(), &filters).await?;

        tx.commit().await?;
        Ok(Page { items, pagination: Pagination::new(params, total) })
    }
}
