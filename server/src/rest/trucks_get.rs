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

//! API to list trucks.

use crate::db::TruckFilters;
use crate::driver::{FleetDriver, TRUCK_ORDER_FIELDS};
use crate::model::{OrderBy, PageParams};
use crate::rest::{ApiResponse, PageBody, TruckBody, get_bearer_auth};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use fleet_core::rest::{EmptyBody, RestError};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters accepted by this API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrucksQuery {
    /// Restricts the listing to trucks assigned to this driver.
    pub(crate) driver_id: Option<Uuid>,

    /// Restricts the listing to trucks manufactured in this year.
    pub(crate) year: Option<i16>,

    /// Restricts the listing to trucks whose plate or model contains this term.
    pub(crate) search: Option<String>,

    /// `field:direction` ordering clause for the listing.
    pub(crate) order: Option<String>,

    /// Maximum number of entries to return.
    pub(crate) limit: Option<u32>,

    /// Number of entries to skip from the beginning of the listing.
    pub(crate) offset: Option<u32>,
}

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<FleetDriver>,
    Query(query): Query<TrucksQuery>,
    headers: HeaderMap,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let token = get_bearer_auth(&headers, driver.realm())?;

    let filters =
        TruckFilters { driver_id: query.driver_id, year: query.year, search: query.search };
    let order = OrderBy::parse(query.order.as_deref(), TRUCK_ORDER_FIELDS);
    let params = PageParams::new(query.limit, query.offset)?;

    let page = driver.list_trucks(token, filters, order, params).await?;

    Ok(Json(ApiResponse::new(PageBody::<TruckBody>::from(page))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::testutils::*;
    use axum::http;
    use fleet_core::rest::testutils::OneShotBuilder;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1/trucks".to_owned())
    }

    #[tokio::test]
    async fn test_search_matches_plate_and_model() {
        let context = TestContext::setup().await;

        context.create_test_truck("ABC-1234", "FH 540", Some(2020), None).await;
        context.create_test_truck("ZZZ-9999", "Actros 2651", Some(2018), None).await;
        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("search", "ABC")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<TruckBody>>>()
            .await;
        assert_eq!(1, response.data.data.len());
        assert_eq!("ABC-1234", response.data.data[0].plate);

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("search", "Actros")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<TruckBody>>>()
            .await;
        assert_eq!(1, response.data.data.len());
        assert_eq!("ZZZ-9999", response.data.data[0].plate);

        // A term that matches nothing yields an empty page, not an error.
        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("search", "QQQ")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<TruckBody>>>()
            .await;
        assert!(response.data.data.is_empty());
        assert_eq!(0, response.data.pagination.total);
        assert!(!response.data.pagination.has_more);
    }

    #[tokio::test]
    async fn test_filter_by_year_and_order() {
        let context = TestContext::setup().await;

        context.create_test_truck("ABC-1234", "FH 540", Some(2020), None).await;
        context.create_test_truck("DEF-5678", "FH 460", Some(2020), None).await;
        context.create_test_truck("ZZZ-9999", "Actros 2651", Some(2018), None).await;
        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_query(&[("year", "2020"), ("order", "plate:ASC")])
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<TruckBody>>>()
            .await;
        assert_eq!(
            vec!["ABC-1234", "DEF-5678"],
            response.data.data.iter().map(|t| t.plate.as_str()).collect::<Vec<&str>>()
        );
        assert_eq!(2, response.data.pagination.total);
    }

    #[tokio::test]
    async fn test_unassigned_trucks_have_null_driver() {
        let context = TestContext::setup().await;

        context.create_test_truck("ABC-1234", "FH 540", None, None).await;
        context.create_test_user("ana@example.com", "the-password").await;
        let token = context.do_test_login("ana@example.com", "the-password").await;

        let response = OneShotBuilder::new(context.app(), route())
            .with_bearer_auth(token.as_str())
            .send_empty()
            .await
            .expect_json::<ApiResponse<PageBody<TruckBody>>>()
            .await;
        assert_eq!(None, response.data.data[0].driver_id);
        assert_eq!(None, response.data.data[0].year);
    }
}
