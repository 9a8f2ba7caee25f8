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

//! Extends the driver with the driver profile management operations.

use crate::db::{self, DriverFilters};
use crate::driver::FleetDriver;
use crate::driver::authz::{self, Operation, Resource};
use crate::model::{
    AccessToken, Driver, DriverStatus, License, OrderBy, Page, PageParams, Pagination,
    validate_search,
};
use fleet_core::db::DbError;
use fleet_core::driver::{DriverError, DriverResult};
use uuid::Uuid;

/// Fields a listing of drivers may be ordered by.
pub(crate) const DRIVER_ORDER_FIELDS: &[&str] =
    &["id", "name", "license", "status", "createdAt", "updatedAt"];

impl FleetDriver {
    /// Creates a driver profile for the user `user_id`.  The status defaults to pending
    /// unless explicitly given.
    ///
    /// Each user can own at most one profile and each license can appear at most once, and
    /// both are checked here before touching the name so that the caller gets the most
    /// specific error first.
    pub(crate) async fn create_driver(
        self,
        token: AccessToken,
        user_id: Uuid,
        name: String,
        license: License,
        status: Option<DriverStatus>,
    ) -> DriverResult<Driver> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Drivers, Operation::Create)?;

        match db::get_user(tx.ex(), user_id).await {
            Ok(_) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("User not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        if db::get_driver_by_user_id(tx.ex(), user_id).await?.is_some() {
            return Err(DriverError::AlreadyExists(
                "User already has a driver profile".to_owned(),
            ));
        }

        if db::get_driver_by_license(tx.ex(), &license).await?.is_some() {
            return Err(DriverError::AlreadyExists("License already in use".to_owned()));
        }

        let driver =
            Driver::new(user_id, name, license, status.unwrap_or(DriverStatus::Pending), now)?;
        db::create_driver(tx.ex(), &driver).await?;

        tx.commit().await?;
        Ok(driver)
    }

    /// Gets the details of the driver `id`.
    pub(crate) async fn get_driver(self, token: AccessToken, id: Uuid) -> DriverResult<Driver> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Drivers, Operation::Read)?;

        let driver = match db::get_driver(tx.ex(), id).await {
            Ok(driver) => driver,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Driver not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(driver)
    }

    /// Updates the driver `id` with any of the given fields, leaving the others untouched.
    pub(crate) async fn update_driver(
        self,
        token: AccessToken,
        id: Uuid,
        name: Option<String>,
        license: Option<License>,
        status: Option<DriverStatus>,
    ) -> DriverResult<Driver> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Drivers, Operation::Update)?;

        let driver = match db::get_driver(tx.ex(), id).await {
            Ok(driver) => driver,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Driver not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(license) = &license {
            match db::get_driver_by_license(tx.ex(), license).await? {
                Some(other) if other.id() != driver.id() => {
                    return Err(DriverError::AlreadyExists("License already in use".to_owned()));
                }
                _ => (),
            }
        }

        let driver = driver.apply(name, license, status, now)?;
        db::update_driver(tx.ex(), &driver).await?;

        tx.commit().await?;
        Ok(driver)
    }

    /// Deletes the driver `id`, unless a truck or a freight still references it.
    pub(crate) async fn delete_driver(self, token: AccessToken, id: Uuid) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Drivers, Operation::Delete)?;

        match db::get_driver(tx.ex(), id).await {
            Ok(_) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Driver not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        if db::get_truck_by_driver_id(tx.ex(), id).await?.is_some() {
            return Err(DriverError::AlreadyExists(
                "Driver is still assigned to a truck".to_owned(),
            ));
        }

        if db::count_freights_by_driver(tx.ex(), id).await? > 0 {
            return Err(DriverError::AlreadyExists(
                "Driver still has freights on record".to_owned(),
            ));
        }

        db::delete_driver(tx.ex(), id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Lists the page of drivers selected by `filters`, `order` and `params`.
    pub(crate) async fn list_drivers(
        self,
        token: AccessToken,
        filters: DriverFilters,
        order: OrderBy,
        params: PageParams,
    ) -> DriverResult<Page<Driver>> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Drivers, Operation::Read)?;

        if let Some(search) = &filters.search {
            validate_search(search)?;
        }

        let items = db::list_drivers(tx.ex(), &filters, &order, params).await?;
        let total = db::count_drivers(tx.ex(), &filters).await?;

        tx.commit().await?;
        Ok(Page { items, pagination: Pagination::new(params, total) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testutils::*;
    use crate::model::{Plate, Truck};
    use fleet_core::clocks::Clock;

    #[tokio::test]
    async fn test_create_driver_defaults_to_pending() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let driver = context
            .driver()
            .create_driver(
                token,
                *user.id(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(&DriverStatus::Pending, driver.status());

        let stored = db::get_driver(&mut context.ex().await, *driver.id()).await.unwrap();
        assert_eq!(driver, stored);
    }

    #[tokio::test]
    async fn test_create_driver_requires_admin() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        // The caller is rejected even though the request would also fail validation, so
        // unprivileged callers cannot use errors to probe for data.
        match context
            .driver()
            .create_driver(
                token,
                *user.id(),
                "X".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
        {
            Err(DriverError::Forbidden(msg)) => assert!(msg.contains("Administrator")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_create_driver_unknown_user() {
        let context = TestContext::setup().await;

        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        match context
            .driver()
            .create_driver(
                token,
                Uuid::new_v4(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
        {
            Err(DriverError::NotFound(msg)) => assert!(msg.contains("User")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_create_driver_uniqueness() {
        let context = TestContext::setup().await;

        let user1 = context.create_test_user("ana@example.com", "the-password").await;
        let user2 = context.create_test_user("bruno@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        context
            .driver()
            .create_driver(
                token.clone(),
                *user1.id(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
            .unwrap();

        // The user-to-profile binding is one to one.
        match context
            .driver()
            .create_driver(
                token.clone(),
                *user1.id(),
                "Ana Souza".to_owned(),
                License::new("55566677788").unwrap(),
                None,
            )
            .await
        {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("profile")),
            e => panic!("{:?}", e),
        }

        // Licenses are unique across profiles.
        match context
            .driver()
            .create_driver(
                token,
                *user2.id(),
                "Bruno Lima".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
        {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("License")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_create_driver_bad_name() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        match context
            .driver()
            .create_driver(
                token,
                *user.id(),
                "R2 D2".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
        {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("Name")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_driver_license_self_exclusion() {
        let context = TestContext::setup().await;

        let user1 = context.create_test_user("ana@example.com", "the-password").await;
        let user2 = context.create_test_user("bruno@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let driver1 = context
            .driver()
            .create_driver(
                token.clone(),
                *user1.id(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
            .unwrap();
        context
            .driver()
            .create_driver(
                token.clone(),
                *user2.id(),
                "Bruno Lima".to_owned(),
                License::new("55566677788").unwrap(),
                None,
            )
            .await
            .unwrap();

        // Reasserting the driver's own license along another change is fine.
        let updated = context
            .driver()
            .update_driver(
                token.clone(),
                *driver1.id(),
                None,
                Some(License::new("11122233344").unwrap()),
                Some(DriverStatus::Active),
            )
            .await
            .unwrap();
        assert_eq!(&DriverStatus::Active, updated.status());

        // Taking over another driver's license is not.
        match context
            .driver()
            .update_driver(
                token,
                *driver1.id(),
                None,
                Some(License::new("55566677788").unwrap()),
                None,
            )
            .await
        {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("License")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_driver_requires_admin() {
        let context = TestContext::setup().await;

        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        match context
            .driver()
            .update_driver(token, Uuid::new_v4(), None, None, Some(DriverStatus::Active))
            .await
        {
            Err(DriverError::Forbidden(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_delete_driver_blocked_by_truck() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let driver = context
            .driver()
            .create_driver(
                token.clone(),
                *user.id(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
            .unwrap();

        let truck = Truck::new(
            Plate::new("ABC-1234").unwrap(),
            "FH 540".to_owned(),
            Some(2020),
            Some(*driver.id()),
            context.clock.now_utc(),
        )
        .unwrap();
        db::create_truck(&mut context.ex().await, &truck).await.unwrap();

        match context.driver().delete_driver(token.clone(), *driver.id()).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("truck")),
            e => panic!("{:?}", e),
        }

        // Unassigning the truck makes the deletion possible.
        context
            .driver()
            .update_truck(token.clone(), *truck.id(), None, None, None, Some(None))
            .await
            .unwrap();
        context.driver().delete_driver(token.clone(), *driver.id()).await.unwrap();

        match context.driver().delete_driver(token, *driver.id()).await {
            Err(DriverError::NotFound(_)) => (),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_delete_driver_blocked_by_freights() {
        let context = TestContext::setup().await;

        let user = context.create_test_user("ana@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        let driver = context
            .driver()
            .create_driver(
                token.clone(),
                *user.id(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                None,
            )
            .await
            .unwrap();
        let truck = context
            .driver()
            .create_truck(
                token.clone(),
                Plate::new("ABC-1234").unwrap(),
                "FH 540".to_owned(),
                Some(2020),
                None,
            )
            .await
            .unwrap();
        context.create_test_freight(*driver.id(), *truck.id()).await;

        match context.driver().delete_driver(token, *driver.id()).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("freights")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_list_drivers_filters() {
        let context = TestContext::setup().await;

        let user1 = context.create_test_user("ana@example.com", "the-password").await;
        let user2 = context.create_test_user("bruno@example.com", "the-password").await;
        context.create_test_admin("root@example.com", "the-password").await;
        let token = context.do_test_login("root@example.com", "the-password").await;

        context
            .driver()
            .create_driver(
                token.clone(),
                *user1.id(),
                "Ana Souza".to_owned(),
                License::new("11122233344").unwrap(),
                Some(DriverStatus::Active),
            )
            .await
            .unwrap();
        context
            .driver()
            .create_driver(
                token.clone(),
                *user2.id(),
                "Bruno Lima".to_owned(),
                License::new("55566677788").unwrap(),
                None,
            )
            .await
            .unwrap();

        let page = context
            .driver()
            .list_drivers(
                token.clone(),
                DriverFilters { status: Some(DriverStatus::Active), ..Default::default() },
                OrderBy::default(),
                PageParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(1, page.items.len());
        assert_eq!("Ana Souza", page.items[0].name());
        assert_eq!(1, page.pagination.total);
        assert!(!page.pagination.has_more);

        // The search term matches names and licenses alike.
        let page = context
            .driver()
            .list_drivers(
                token,
                DriverFilters { search: Some("555666".to_owned()), ..Default::default() },
                OrderBy::default(),
                PageParams::default(),
            )
            .await
            .unwrap();
        assert_eq!(1, page.items.len());
        assert_eq!("Bruno Lima", page.items[0].name());
    }
}
