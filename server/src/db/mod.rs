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

//! Database abstraction to manipulate the fleet entities.

use crate::model::{
    AccessToken, Driver, DriverStatus, Freight, FreightStatus, HashedPassword, License, OrderBy,
    OrderDirection, PageParams, Plate, Price, Role, Session, Truck, User,
};
use fleet_core::db::{DbError, DbResult, Executor};
#[cfg(feature = "postgres")]
use fleet_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use fleet_core::db::sqlite::{self, build_timestamp, unpack_timestamp};
use fleet_core::model::EmailAddress;
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::SqliteRow;
#[cfg(feature = "postgres")]
use time::OffsetDateTime;
use uuid::Uuid;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Filters that narrow down a listing of users.
#[derive(Clone, Debug, Default)]
pub(crate) struct UserFilters {
    /// Restricts the listing to users with this role.
    pub(crate) role: Option<Role>,

    /// Restricts the listing to users whose email contains this term.
    pub(crate) search: Option<String>,
}

/// Filters that narrow down a listing of drivers.
#[derive(Clone, Debug, Default)]
pub(crate) struct DriverFilters {
    /// Restricts the listing to drivers with this status.
    pub(crate) status: Option<DriverStatus>,

    /// Restricts the listing to the driver bound to this user.
    pub(crate) user_id: Option<Uuid>,

    /// Restricts the listing to drivers whose name or license contains this term.
    pub(crate) search: Option<String>,
}

/// Filters that narrow down a listing of trucks.
#[derive(Clone, Debug, Default)]
pub(crate) struct TruckFilters {
    /// Restricts the listing to trucks assigned to this driver.
    pub(crate) driver_id: Option<Uuid>,

    /// Restricts the listing to trucks manufactured in this year.
    pub(crate) year: Option<i16>,

    /// Restricts the listing to trucks whose plate or model contains this term.
    pub(crate) search: Option<String>,
}

/// Converts a free-form search term into a substring match pattern.
fn like_pattern(search: &str) -> String {
    format!("%{}%", search)
}

/// Returns the SQL keyword for an ordering direction.
fn direction_sql(direction: OrderDirection) -> &'static str {
    match direction {
        OrderDirection::Asc => "ASC",
        OrderDirection::Desc => "DESC",
    }
}

/// Builds the ORDER BY clause for `order` against a PostgreSQL table.
///
/// The field was already constrained to a per-entity set of real columns when the `OrderBy`
/// was parsed, so interpolating it here is safe.  Ties are broken by the primary key so that
/// pagination is stable.
#[cfg(feature = "postgres")]
fn pg_order_by(order: &OrderBy) -> String {
    let dir = direction_sql(order.direction());
    let column = match order.field() {
        "createdAt" => "created_at",
        "updatedAt" => "updated_at",
        field => field,
    };
    format!("ORDER BY {} {}, id ASC", column, dir)
}

/// Builds the ORDER BY clause for `order` against an SQLite table, where timestamps are
/// stored as two separate integer columns.
#[cfg(any(feature = "sqlite", test))]
fn sqlite_order_by(order: &OrderBy) -> String {
    let dir = direction_sql(order.direction());
    match order.field() {
        "createdAt" => {
            format!("ORDER BY created_at_secs {}, created_at_nsecs {}, id ASC", dir, dir)
        }
        "updatedAt" => {
            format!("ORDER BY updated_at_secs {}, updated_at_nsecs {}, id ASC", dir, dir)
        }
        field => format!("ORDER BY {} {}, id ASC", field, dir),
    }
}

/// Parses a UUID stored as text by the SQLite backend.
#[cfg(any(feature = "sqlite", test))]
fn parse_uuid(raw: &str) -> DbResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DbError::DataIntegrityError(format!("Invalid UUID: {}", e)))
}

/// Converts a count query result into an unsigned total.
fn count_to_u64(count: i64) -> DbResult<u64> {
    u64::try_from(count)
        .map_err(|_| DbError::DataIntegrityError(format!("Invalid count {}", count)))
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for User {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(postgres::map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(postgres::map_sqlx_error)?;
        let role: String = row.try_get("role").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(User::from_parts(
            id,
            EmailAddress::new(email)?,
            HashedPassword::new(password),
            Role::parse(&role)?,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for User {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(sqlite::map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(sqlite::map_sqlx_error)?;
        let role: String = row.try_get("role").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(User::from_parts(
            parse_uuid(&id)?,
            EmailAddress::new(email)?,
            HashedPassword::new(password),
            Role::parse(&role)?,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Driver {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let user_id: Uuid = row.try_get("user_id").map_err(postgres::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
        let license: String = row.try_get("license").map_err(postgres::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Driver::from_parts(
            id,
            user_id,
            name,
            License::new(license)?,
            DriverStatus::parse(&status)?,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Driver {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let user_id: String = row.try_get("user_id").map_err(sqlite::map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
        let license: String = row.try_get("license").map_err(sqlite::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Driver::from_parts(
            parse_uuid(&id)?,
            parse_uuid(&user_id)?,
            name,
            License::new(license)?,
            DriverStatus::parse(&status)?,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Truck {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let plate: String = row.try_get("plate").map_err(postgres::map_sqlx_error)?;
        let model: String = row.try_get("model").map_err(postgres::map_sqlx_error)?;
        let year: Option<i16> = row.try_get("year").map_err(postgres::map_sqlx_error)?;
        let driver_id: Option<Uuid> =
            row.try_get("driver_id").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Truck::from_parts(
            id,
            Plate::new(plate)?,
            model,
            year,
            driver_id,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Truck {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let plate: String = row.try_get("plate").map_err(sqlite::map_sqlx_error)?;
        let model: String = row.try_get("model").map_err(sqlite::map_sqlx_error)?;
        let year: Option<i64> = row.try_get("year").map_err(sqlite::map_sqlx_error)?;
        let driver_id: Option<String> =
            row.try_get("driver_id").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        let year = match year {
            Some(year) => Some(i16::try_from(year).map_err(|_| {
                DbError::DataIntegrityError(format!("Invalid year {}", year))
            })?),
            None => None,
        };
        let driver_id = match driver_id {
            Some(raw) => Some(parse_uuid(&raw)?),
            None => None,
        };

        Ok(Truck::from_parts(
            parse_uuid(&id)?,
            Plate::new(plate)?,
            model,
            year,
            driver_id,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Freight {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
        let driver_id: Uuid = row.try_get("driver_id").map_err(postgres::map_sqlx_error)?;
        let truck_id: Uuid = row.try_get("truck_id").map_err(postgres::map_sqlx_error)?;
        let origin: String = row.try_get("origin").map_err(postgres::map_sqlx_error)?;
        let destination: String =
            row.try_get("destination").map_err(postgres::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(postgres::map_sqlx_error)?;
        let price: i64 = row.try_get("price").map_err(postgres::map_sqlx_error)?;
        let created_at: OffsetDateTime =
            row.try_get("created_at").map_err(postgres::map_sqlx_error)?;
        let updated_at: OffsetDateTime =
            row.try_get("updated_at").map_err(postgres::map_sqlx_error)?;

        Ok(Freight::from_parts(
            id,
            driver_id,
            truck_id,
            origin,
            destination,
            FreightStatus::parse(&status)?,
            Price::new(price)?,
            created_at,
            updated_at,
        ))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Freight {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: String = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
        let driver_id: String = row.try_get("driver_id").map_err(sqlite::map_sqlx_error)?;
        let truck_id: String = row.try_get("truck_id").map_err(sqlite::map_sqlx_error)?;
        let origin: String = row.try_get("origin").map_err(sqlite::map_sqlx_error)?;
        let destination: String = row.try_get("destination").map_err(sqlite::map_sqlx_error)?;
        let status: String = row.try_get("status").map_err(sqlite::map_sqlx_error)?;
        let price: i64 = row.try_get("price").map_err(sqlite::map_sqlx_error)?;
        let created_at_secs: i64 =
            row.try_get("created_at_secs").map_err(sqlite::map_sqlx_error)?;
        let created_at_nsecs: i64 =
            row.try_get("created_at_nsecs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_secs: i64 =
            row.try_get("updated_at_secs").map_err(sqlite::map_sqlx_error)?;
        let updated_at_nsecs: i64 =
            row.try_get("updated_at_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Freight::from_parts(
            parse_uuid(&id)?,
            parse_uuid(&driver_id)?,
            parse_uuid(&truck_id)?,
            origin,
            destination,
            FreightStatus::parse(&status)?,
            Price::new(price)?,
            build_timestamp(created_at_secs, created_at_nsecs)?,
            build_timestamp(updated_at_secs, updated_at_nsecs)?,
        ))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for Session {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let access_token: String =
            row.try_get("access_token").map_err(postgres::map_sqlx_error)?;
        let user_id: Uuid = row.try_get("user_id").map_err(postgres::map_sqlx_error)?;
        let login_time: OffsetDateTime =
            row.try_get("login_time").map_err(postgres::map_sqlx_error)?;

        Ok(Session::from_parts(AccessToken::new(access_token)?, user_id, login_time))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for Session {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let access_token: String =
            row.try_get("access_token").map_err(sqlite::map_sqlx_error)?;
        let user_id: String = row.try_get("user_id").map_err(sqlite::map_sqlx_error)?;
        let login_time_secs: i64 =
            row.try_get("login_time_secs").map_err(sqlite::map_sqlx_error)?;
        let login_time_nsecs: i64 =
            row.try_get("login_time_nsecs").map_err(sqlite::map_sqlx_error)?;

        Ok(Session::from_parts(
            AccessToken::new(access_token)?,
            parse_uuid(&user_id)?,
            build_timestamp(login_time_secs, login_time_nsecs)?,
        ))
    }
}

/// Persists a new `user`.
pub(crate) async fn create_user(ex: &mut Executor, user: &User) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO users (id, email, password, role, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)";
            let done = sqlx::query(query_str)
                .bind(user.id())
                .bind(user.email().as_str())
                .bind(user.password().as_str())
                .bind(user.role().as_str())
                .bind(user.created_at())
                .bind(user.updated_at())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_at_secs, created_at_nsecs) = unpack_timestamp(*user.created_at());
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*user.updated_at());

            let query_str = "
                INSERT INTO users
                    (id, email, password, role,
                     created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(user.id().to_string())
                .bind(user.email().as_str())
                .bind(user.password().as_str())
                .bind(user.role().as_str())
                .bind(created_at_secs)
                .bind(created_at_nsecs)
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets an existing user by its `id`.
pub(crate) async fn get_user(ex: &mut Executor, id: Uuid) -> DbResult<User> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM users WHERE id = $1";
            let raw_user = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE id = ?";
            let raw_user = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets an existing user by its `email` address.
pub(crate) async fn get_user_by_email(
    ex: &mut Executor,
    email: &EmailAddress,
) -> DbResult<User> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM users WHERE email = $1";
            let raw_user = sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE email = ?";
            let raw_user = sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            User::try_from(raw_user)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Persists the modified fields of an existing `user`.
pub(crate) async fn update_user(ex: &mut Executor, user: &User) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE users SET email = $1, password = $2, role = $3, updated_at = $4
                WHERE id = $5";
            let done = sqlx::query(query_str)
                .bind(user.email().as_str())
                .bind(user.password().as_str())
                .bind(user.role().as_str())
                .bind(user.updated_at())
                .bind(user.id())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*user.updated_at());

            let query_str = "
                UPDATE users
                SET email = ?, password = ?, role = ?, updated_at_secs = ?, updated_at_nsecs = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(user.email().as_str())
                .bind(user.password().as_str())
                .bind(user.role().as_str())
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .bind(user.id().to_string())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes an existing user by its `id`.
///
/// The user's sessions go away with the user, so any rows they still have in the sessions
/// table are dropped first within the same transaction.
pub(crate) async fn delete_user(ex: &mut Executor, id: Uuid) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM sessions WHERE user_id = $1";
            sqlx::query(query_str)
                .bind(id)
                .execute(&mut *ex)
                .await
                .map_err(postgres::map_sqlx_error)?;

            let query_str = "DELETE FROM users WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM sessions WHERE user_id = ?";
            sqlx::query(query_str)
                .bind(id.to_string())
                .execute(&mut *ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;

            let query_str = "DELETE FROM users WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Lists the page of users selected by `filters`, `order` and `params`.
pub(crate) async fn list_users(
    ex: &mut Executor,
    filters: &UserFilters,
    order: &OrderBy,
    params: PageParams,
) -> DbResult<Vec<User>> {
    let role = filters.role.map(|r| r.as_str());
    let search = filters.search.as_deref().map(like_pattern);

    let raw_users = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "
                SELECT * FROM users
                WHERE ($1 IS NULL OR role = $1) AND ($2 IS NULL OR email ILIKE $2)
                {}
                LIMIT $3 OFFSET $4",
                pg_order_by(order)
            );
            sqlx::query(&query_str)
                .bind(role)
                .bind(&search)
                .bind(i64::from(params.limit()))
                .bind(i64::from(params.offset()))
                .fetch_all(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(User::try_from)
                .collect::<DbResult<Vec<User>>>()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "
                SELECT * FROM users
                WHERE (? IS NULL OR role = ?) AND (? IS NULL OR email LIKE ?)
                {}
                LIMIT ? OFFSET ?",
                sqlite_order_by(order)
            );
            sqlx::query(&query_str)
                .bind(role)
                .bind(role)
                .bind(&search)
                .bind(&search)
                .bind(i64::from(params.limit()))
                .bind(i64::from(params.offset()))
                .fetch_all(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(User::try_from)
                .collect::<DbResult<Vec<User>>>()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    raw_users
}

/// Counts the users selected by `filters`.
pub(crate) async fn count_users(ex: &mut Executor, filters: &UserFilters) -> DbResult<u64> {
    let role = filters.role.map(|r| r.as_str());
    let search = filters.search.as_deref().map(like_pattern);

    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM users
                WHERE ($1 IS NULL OR role = $1) AND ($2 IS NULL OR email ILIKE $2)";
            let row = sqlx::query(query_str)
                .bind(role)
                .bind(&search)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM users
                WHERE (? IS NULL OR role = ?) AND (? IS NULL OR email LIKE ?)";
            let row = sqlx::query(query_str)
                .bind(role)
                .bind(role)
                .bind(&search)
                .bind(&search)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    count_to_u64(count)
}

/// Persists a new `driver`.
pub(crate) async fn create_driver(ex: &mut Executor, driver: &Driver) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO drivers (id, user_id, name, license, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)";
            let done = sqlx::query(query_str)
                .bind(driver.id())
                .bind(driver.user_id())
                .bind(driver.name())
                .bind(driver.license().as_str())
                .bind(driver.status().as_str())
                .bind(driver.created_at())
                .bind(driver.updated_at())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_at_secs, created_at_nsecs) = unpack_timestamp(*driver.created_at());
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*driver.updated_at());

            let query_str = "
                INSERT INTO drivers
                    (id, user_id, name, license, status,
                     created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(driver.id().to_string())
                .bind(driver.user_id().to_string())
                .bind(driver.name())
                .bind(driver.license().as_str())
                .bind(driver.status().as_str())
                .bind(created_at_secs)
                .bind(created_at_nsecs)
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets an existing driver by its `id`.
pub(crate) async fn get_driver(ex: &mut Executor, id: Uuid) -> DbResult<Driver> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM drivers WHERE id = $1";
            let raw_driver = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Driver::try_from(raw_driver)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM drivers WHERE id = ?";
            let raw_driver = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Driver::try_from(raw_driver)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the driver bound to `user_id`, if any.
pub(crate) async fn get_driver_by_user_id(
    ex: &mut Executor,
    user_id: Uuid,
) -> DbResult<Option<Driver>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM drivers WHERE user_id = $1";
            let raw_driver = sqlx::query(query_str)
                .bind(user_id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw_driver.map(Driver::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM drivers WHERE user_id = ?";
            let raw_driver = sqlx::query(query_str)
                .bind(user_id.to_string())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw_driver.map(Driver::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the driver holding `license`, if any.
pub(crate) async fn get_driver_by_license(
    ex: &mut Executor,
    license: &License,
) -> DbResult<Option<Driver>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM drivers WHERE license = $1";
            let raw_driver = sqlx::query(query_str)
                .bind(license.as_str())
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw_driver.map(Driver::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM drivers WHERE license = ?";
            let raw_driver = sqlx::query(query_str)
                .bind(license.as_str())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw_driver.map(Driver::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Persists the modified fields of an existing `driver`.
pub(crate) async fn update_driver(ex: &mut Executor, driver: &Driver) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE drivers SET name = $1, license = $2, status = $3, updated_at = $4
                WHERE id = $5";
            let done = sqlx::query(query_str)
                .bind(driver.name())
                .bind(driver.license().as_str())
                .bind(driver.status().as_str())
                .bind(driver.updated_at())
                .bind(driver.id())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*driver.updated_at());

            let query_str = "
                UPDATE drivers
                SET name = ?, license = ?, status = ?, updated_at_secs = ?, updated_at_nsecs = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(driver.name())
                .bind(driver.license().as_str())
                .bind(driver.status().as_str())
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .bind(driver.id().to_string())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes an existing driver by its `id`.
pub(crate) async fn delete_driver(ex: &mut Executor, id: Uuid) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM drivers WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM drivers WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Lists the page of drivers selected by `filters`, `order` and `params`.
pub(crate) async fn list_drivers(
    ex: &mut Executor,
    filters: &DriverFilters,
    order: &OrderBy,
    params: PageParams,
) -> DbResult<Vec<Driver>> {
    let status = filters.status.map(|s| s.as_str());
    let search = filters.search.as_deref().map(like_pattern);

    let raw_drivers = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "
                SELECT * FROM drivers
                WHERE ($1 IS NULL OR status = $1)
                    AND ($2 IS NULL OR user_id = $2)
                    AND ($3 IS NULL OR name ILIKE $3 OR license ILIKE $3)
                {}
                LIMIT $4 OFFSET $5",
                pg_order_by(order)
            );
            sqlx::query(&query_str)
                .bind(status)
                .bind(filters.user_id)
                .bind(&search)
                .bind(i64::from(params.limit()))
                .bind(i64::from(params.offset()))
                .fetch_all(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Driver::try_from)
                .collect::<DbResult<Vec<Driver>>>()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let user_id = filters.user_id.map(|id| id.to_string());
            let query_str = format!(
                "
                SELECT * FROM drivers
                WHERE (? IS NULL OR status = ?)
                    AND (? IS NULL OR user_id = ?)
                    AND (? IS NULL OR name LIKE ? OR license LIKE ?)
                {}
                LIMIT ? OFFSET ?",
                sqlite_order_by(order)
            );
            sqlx::query(&query_str)
                .bind(status)
                .bind(status)
                .bind(&user_id)
                .bind(&user_id)
                .bind(&search)
                .bind(&search)
                .bind(&search)
                .bind(i64::from(params.limit()))
                .bind(i64::from(params.offset()))
                .fetch_all(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Driver::try_from)
                .collect::<DbResult<Vec<Driver>>>()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    raw_drivers
}

/// Counts the drivers selected by `filters`.
pub(crate) async fn count_drivers(ex: &mut Executor, filters: &DriverFilters) -> DbResult<u64> {
    let status = filters.status.map(|s| s.as_str());
    let search = filters.search.as_deref().map(like_pattern);

    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM drivers
                WHERE ($1 IS NULL OR status = $1)
                    AND ($2 IS NULL OR user_id = $2)
                    AND ($3 IS NULL OR name ILIKE $3 OR license ILIKE $3)";
            let row = sqlx::query(query_str)
                .bind(status)
                .bind(filters.user_id)
                .bind(&search)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let user_id = filters.user_id.map(|id| id.to_string());
            let query_str = "
                SELECT COUNT(*) AS count FROM drivers
                WHERE (? IS NULL OR status = ?)
                    AND (? IS NULL OR user_id = ?)
                    AND (? IS NULL OR name LIKE ? OR license LIKE ?)";
            let row = sqlx::query(query_str)
                .bind(status)
                .bind(status)
                .bind(&user_id)
                .bind(&user_id)
                .bind(&search)
                .bind(&search)
                .bind(&search)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    count_to_u64(count)
}

/// Persists a new `truck`.
pub(crate) async fn create_truck(ex: &mut Executor, truck: &Truck) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO trucks (id, plate, model, year, driver_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)";
            let done = sqlx::query(query_str)
                .bind(truck.id())
                .bind(truck.plate().as_str())
                .bind(truck.model())
                .bind(truck.year())
                .bind(truck.driver_id())
                .bind(truck.created_at())
                .bind(truck.updated_at())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_at_secs, created_at_nsecs) = unpack_timestamp(*truck.created_at());
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*truck.updated_at());

            let query_str = "
                INSERT INTO trucks
                    (id, plate, model, year, driver_id,
                     created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(truck.id().to_string())
                .bind(truck.plate().as_str())
                .bind(truck.model())
                .bind(truck.year().map(i64::from))
                .bind(truck.driver_id().map(|id| id.to_string()))
                .bind(created_at_secs)
                .bind(created_at_nsecs)
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets an existing truck by its `id`.
pub(crate) async fn get_truck(ex: &mut Executor, id: Uuid) -> DbResult<Truck> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM trucks WHERE id = $1";
            let raw_truck = sqlx::query(query_str)
                .bind(id)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Truck::try_from(raw_truck)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM trucks WHERE id = ?";
            let raw_truck = sqlx::query(query_str)
                .bind(id.to_string())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Truck::try_from(raw_truck)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the truck carrying `plate`, if any.
pub(crate) async fn get_truck_by_plate(
    ex: &mut Executor,
    plate: &Plate,
) -> DbResult<Option<Truck>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM trucks WHERE plate = $1";
            let raw_truck = sqlx::query(query_str)
                .bind(plate.as_str())
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw_truck.map(Truck::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM trucks WHERE plate = ?";
            let raw_truck = sqlx::query(query_str)
                .bind(plate.as_str())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw_truck.map(Truck::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the truck the driver `driver_id` is assigned to, if any.
pub(crate) async fn get_truck_by_driver_id(
    ex: &mut Executor,
    driver_id: Uuid,
) -> DbResult<Option<Truck>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM trucks WHERE driver_id = $1";
            let raw_truck = sqlx::query(query_str)
                .bind(driver_id)
                .fetch_optional(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            raw_truck.map(Truck::try_from).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM trucks WHERE driver_id = ?";
            let raw_truck = sqlx::query(query_str)
                .bind(driver_id.to_string())
                .fetch_optional(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            raw_truck.map(Truck::try_from).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Persists the modified fields of an existing `truck`.
pub(crate) async fn update_truck(ex: &mut Executor, truck: &Truck) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE trucks
                SET plate = $1, model = $2, year = $3, driver_id = $4, updated_at = $5
                WHERE id = $6";
            let done = sqlx::query(query_str)
                .bind(truck.plate().as_str())
                .bind(truck.model())
                .bind(truck.year())
                .bind(truck.driver_id())
                .bind(truck.updated_at())
                .bind(truck.id())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*truck.updated_at());

            let query_str = "
                UPDATE trucks
                SET plate = ?, model = ?, year = ?, driver_id = ?,
                    updated_at_secs = ?, updated_at_nsecs = ?
                WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(truck.plate().as_str())
                .bind(truck.model())
                .bind(truck.year().map(i64::from))
                .bind(truck.driver_id().map(|id| id.to_string()))
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .bind(truck.id().to_string())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes an existing truck by its `id`.
pub(crate) async fn delete_truck(ex: &mut Executor, id: Uuid) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM trucks WHERE id = $1";
            let done = sqlx::query(query_str)
                .bind(id)
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM trucks WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.to_string())
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}

/// Lists the page of trucks selected by `filters`, `order` and `params`.
pub(crate) async fn list_trucks(
    ex: &mut Executor,
    filters: &TruckFilters,
    order: &OrderBy,
    params: PageParams,
) -> DbResult<Vec<Truck>> {
    let search = filters.search.as_deref().map(like_pattern);

    let raw_trucks = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "
                SELECT * FROM trucks
                WHERE ($1 IS NULL OR driver_id = $1)
                    AND ($2 IS NULL OR year = $2)
                    AND ($3 IS NULL OR plate ILIKE $3 OR model ILIKE $3)
                {}
                LIMIT $4 OFFSET $5",
                pg_order_by(order)
            );
            sqlx::query(&query_str)
                .bind(filters.driver_id)
                .bind(filters.year)
                .bind(&search)
                .bind(i64::from(params.limit()))
                .bind(i64::from(params.offset()))
                .fetch_all(ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .into_iter()
                .map(Truck::try_from)
                .collect::<DbResult<Vec<Truck>>>()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let driver_id = filters.driver_id.map(|id| id.to_string());
            let year = filters.year.map(i64::from);
            let query_str = format!(
                "
                SELECT * FROM trucks
                WHERE (? IS NULL OR driver_id = ?)
                    AND (? IS NULL OR year = ?)
                    AND (? IS NULL OR plate LIKE ? OR model LIKE ?)
                {}
                LIMIT ? OFFSET ?",
                sqlite_order_by(order)
            );
            sqlx::query(&query_str)
                .bind(&driver_id)
                .bind(&driver_id)
                .bind(year)
                .bind(year)
                .bind(&search)
                .bind(&search)
                .bind(&search)
                .bind(i64::from(params.limit()))
                .bind(i64::from(params.offset()))
                .fetch_all(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .into_iter()
                .map(Truck::try_from)
                .collect::<DbResult<Vec<Truck>>>()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    raw_trucks
}

/// Counts the trucks selected by `filters`.
pub(crate) async fn count_trucks(ex: &mut Executor, filters: &TruckFilters) -> DbResult<u64> {
    let search = filters.search.as_deref().map(like_pattern);

    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT COUNT(*) AS count FROM trucks
                WHERE ($1 IS NULL OR driver_id = $1)
                    AND ($2 IS NULL OR year = $2)
                    AND ($3 IS NULL OR plate ILIKE $3 OR model ILIKE $3)";
            let row = sqlx::query(query_str)
                .bind(filters.driver_id)
                .bind(filters.year)
                .bind(&search)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let driver_id = filters.driver_id.map(|id| id.to_string());
            let year = filters.year.map(i64::from);
            let query_str = "
                SELECT COUNT(*) AS count FROM trucks
                WHERE (? IS NULL OR driver_id = ?)
                    AND (? IS NULL OR year = ?)
                    AND (? IS NULL OR plate LIKE ? OR model LIKE ?)";
            let row = sqlx::query(query_str)
                .bind(&driver_id)
                .bind(&driver_id)
                .bind(year)
                .bind(year)
                .bind(&search)
                .bind(&search)
                .bind(&search)
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    count_to_u64(count)
}

/// Persists a new `freight`.
pub(crate) async fn create_freight(ex: &mut Executor, freight: &Freight) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO freights
                    (id, driver_id, truck_id, origin, destination, status, price,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";
            let done = sqlx::query(query_str)
                .bind(freight.id())
                .bind(freight.driver_id())
                .bind(freight.truck_id())
                .bind(freight.origin())
                .bind(freight.destination())
                .bind(freight.status().as_str())
                .bind(freight.price().as_cents())
                .bind(freight.created_at())
                .bind(freight.updated_at())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (created_at_secs, created_at_nsecs) = unpack_timestamp(*freight.created_at());
            let (updated_at_secs, updated_at_nsecs) = unpack_timestamp(*freight.updated_at());

            let query_str = "
                INSERT INTO freights
                    (id, driver_id, truck_id, origin, destination, status, price,
                     created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(freight.id().to_string())
                .bind(freight.driver_id().to_string())
                .bind(freight.truck_id().to_string())
                .bind(freight.origin())
                .bind(freight.destination())
                .bind(freight.status().as_str())
                .bind(freight.price().as_cents())
                .bind(created_at_secs)
                .bind(created_at_nsecs)
                .bind(updated_at_secs)
                .bind(updated_at_nsecs)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Counts the freights that reference the driver `driver_id`.
pub(crate) async fn count_freights_by_driver(
    ex: &mut Executor,
    driver_id: Uuid,
) -> DbResult<u64> {
    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM freights WHERE driver_id = $1";
            let row = sqlx::query(query_str)
                .bind(driver_id)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM freights WHERE driver_id = ?";
            let row = sqlx::query(query_str)
                .bind(driver_id.to_string())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    count_to_u64(count)
}

/// Counts the freights that reference the truck `truck_id`.
pub(crate) async fn count_freights_by_truck(ex: &mut Executor, truck_id: Uuid) -> DbResult<u64> {
    let count: i64 = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM freights WHERE truck_id = $1";
            let row = sqlx::query(query_str)
                .bind(truck_id)
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("count").map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT COUNT(*) AS count FROM freights WHERE truck_id = ?";
            let row = sqlx::query(query_str)
                .bind(truck_id.to_string())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("count").map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };
    count_to_u64(count)
}

/// Saves a session.
pub(crate) async fn put_session(ex: &mut Executor, session: &Session) -> DbResult<()> {
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO sessions (access_token, user_id, login_time) VALUES ($1, $2, $3)";
            let done = sqlx::query(query_str)
                .bind(session.access_token().as_str())
                .bind(session.user_id())
                .bind(session.login_time())
                .execute(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            done.rows_affected()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let (login_time_secs, login_time_nsecs) = unpack_timestamp(*session.login_time());

            let query_str = "
                INSERT INTO sessions (access_token, user_id, login_time_secs, login_time_nsecs)
                VALUES (?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(session.access_token().as_str())
                .bind(session.user_id().to_string())
                .bind(login_time_secs)
                .bind(login_time_nsecs)
                .execute(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            done.rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    if rows_affected != 1 {
        return Err(DbError::BackendError("Insertion affected more than one row".to_owned()));
    }
    Ok(())
}

/// Gets a session from its access token.
pub(crate) async fn get_session(
    ex: &mut Executor,
    access_token: &AccessToken,
) -> DbResult<Session> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "SELECT * FROM sessions WHERE access_token = $1";
            let raw_session = sqlx::query(query_str)
                .bind(access_token.as_str())
                .fetch_one(ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            Session::try_from(raw_session)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM sessions WHERE access_token = ?";
            let raw_session = sqlx::query(query_str)
                .bind(access_token.as_str())
                .fetch_one(ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Session::try_from(raw_session)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
