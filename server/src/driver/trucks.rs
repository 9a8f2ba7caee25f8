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

//! Extends the driver with the truck management operations.

use crate::db::{self, TruckFilters};
use crate::driver::FleetDriver;
use crate::driver::authz::{self, Operation, Resource};
use crate::model::{
    AccessToken, OrderBy, Page, PageParams, Pagination, Plate, Truck, validate_search,
};
use fleet_core::db::DbError;
use fleet_core::driver::{DriverError, DriverResult};
use uuid::Uuid;

/// Fields a listing of trucks may be ordered by.
pub(crate) const TRUCK_ORDER_FIELDS: &[&str] =
    &["id", "plate", "model", "year", "createdAt", "updatedAt"];

impl FleetDriver {
    /// Makes sure the driver `driver_id` exists and that no truck other than
    /// `exclude_truck_id` is currently assigned to it.
    async fn check_assignment(
        &self,
        tx: &mut fleet_core::db::TxExecutor,
        driver_id: Uuid,
        exclude_truck_id: Option<Uuid>,
    ) -> DriverResult<()> {
        match db::get_driver(tx.ex(), driver_id).await {
            Ok(_) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Driver not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        match db::get_truck_by_driver_id(tx.ex(), driver_id).await? {
            Some(other) if Some(*other.id()) != exclude_truck_id => {
                Err(DriverError::AlreadyExists(
                    "Driver is already assigned to another truck".to_owned(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Registers a new truck with `plate`, optionally assigning a driver to it right away.
    pub(crate) async fn create_truck(
        self,
        token: AccessToken,
        plate: Plate,
        model: String,
        year: Option<i16>,
        driver_id: Option<Uuid>,
    ) -> DriverResult<Truck> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Trucks, Operation::Create)?;

        if db::get_truck_by_plate(tx.ex(), &plate).await?.is_some() {
            return Err(DriverError::AlreadyExists("Plate already in use".to_owned()));
        }

        if let Some(driver_id) = driver_id {
            self.check_assignment(&mut tx, driver_id, None).await?;
        }

        let truck = Truck::new(plate, model, year, driver_id, now)?;
        db::create_truck(tx.ex(), &truck).await?;

        tx.commit().await?;
        Ok(truck)
    }

    /// Gets the details of the truck `id`.
    pub(crate) async fn get_truck(self, token: AccessToken, id: Uuid) -> DriverResult<Truck> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Trucks, Operation::Read)?;

        let truck = match db::get_truck(tx.ex(), id).await {
            Ok(truck) => truck,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Truck not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        Ok(truck)
    }

    /// Updates the truck `id` with any of the given fields, leaving the others untouched.
    ///
    /// The assignment change is doubly-wrapped: a missing outer value keeps the current
    /// driver while `Some(None)` unassigns it.
    pub(crate) async fn update_truck(
        self,
        token: AccessToken,
        id: Uuid,
        plate: Option<Plate>,
        model: Option<String>,
        year: Option<i16>,
        driver_id: Option<Option<Uuid>>,
    ) -> DriverResult<Truck> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Trucks, Operation::Update)?;

        let truck = match db::get_truck(tx.ex(), id).await {
            Ok(truck) => truck,
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Truck not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(plate) = &plate {
            match db::get_truck_by_plate(tx.ex(), plate).await? {
                Some(other) if other.id() != truck.id() => {
                    return Err(DriverError::AlreadyExists("Plate already in use".to_owned()));
                }
                _ => (),
            }
        }

        if let Some(Some(new_driver_id)) = driver_id {
            self.check_assignment(&mut tx, new_driver_id, Some(*truck.id())).await?;
        }

        let truck = truck.apply(plate, model, year, driver_id, now)?;
        db::update_truck(tx.ex(), &truck).await?;

        tx.commit().await?;
        Ok(truck)
    }

    /// Deletes the truck `id`, unless a freight still references it.
    pub(crate) async fn delete_truck(self, token: AccessToken, id: Uuid) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Trucks, Operation::Delete)?;

        match db::get_truck(tx.ex(), id).await {
            Ok(_) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound("Truck not found".to_owned()));
            }
            Err(e) => return Err(e.into()),
        }

        if db::count_freights_by_truck(tx.ex(), id).await? > 0 {
            return Err(DriverError::AlreadyExists(
                "Truck still has freights on record".to_owned(),
            ));
        }

        db::delete_truck(tx.ex(), id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Lists the page of trucks selected by `filters`, `order` and `params`.
    pub(crate) async fn list_trucks(
        self,
        token: AccessToken,
        filters: TruckFilters,
        order: OrderBy,
        params: PageParams,
    ) -> DriverResult<Page<Truck>> {
        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();

        let caller = self.authenticate(&mut tx, now, &token).await?;
        authz::check(*caller.role(), Resource::Trucks, Operation::Read)?;

        if let Some(search) = &filters.search {
            validate_search(search)?;
        }

        let items = db::list_trucks(tx.ex(), &filters, &order, params).await?;
        let total = db::count_trucks(tx.ex(), &filters).await?;

        tx.commit().await?;
        Ok(Page { items, pagination: Pagination::new(params, total) })
    }
}
