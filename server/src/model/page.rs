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

//! Data types to express paginated, ordered listings.

use fleet_core::model::{ModelError, ModelResult};

/// Smallest allowed page size.
const MIN_LIMIT: u32 = 1;

/// Largest allowed page size.
const MAX_LIMIT: u32 = 100;

/// Page size used when the caller does not ask for one.
const DEFAULT_LIMIT: u32 = 20;

/// Minimum length of a search term in characters.
const MIN_SEARCH_LENGTH: usize = 2;

/// Maximum length of a search term in characters.
const MAX_SEARCH_LENGTH: usize = 50;

/// Validates a free-form search term supplied by a caller.
pub(crate) fn validate_search(search: &str) -> ModelResult<()> {
    let count = search.chars().count();
    if !(MIN_SEARCH_LENGTH..=MAX_SEARCH_LENGTH).contains(&count) {
        return Err(ModelError(format!(
            "Search term must be {} to {} characters long",
            MIN_SEARCH_LENGTH, MAX_SEARCH_LENGTH
        )));
    }
    Ok(())
}

/// Window of a listing requested by a caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageParams {
    /// Maximum number of entries to return.
    limit: u32,

    /// Number of entries to skip from the beginning of the listing.
    offset: u32,
}

impl PageParams {
    /// Creates the page window for the given raw `limit` and `offset`, validating their ranges
    /// and filling in defaults for missing values.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> ModelResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(ModelError(format!(
                "Limit must be between {} and {}",
                MIN_LIMIT, MAX_LIMIT
            )));
        }
        Ok(Self { limit, offset: offset.unwrap_or(0) })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, offset: 0 }
    }
}

/// Direction of an ordering clause.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// Ordering clause of a listing, restricted to a per-entity set of allowed fields.
///
/// Fields are expressed in the camelCase form callers use on the wire; the database layer maps
/// them to column names.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderBy {
    /// Field to order by.
    field: String,

    /// Direction to order in.
    direction: OrderDirection,
}

impl OrderBy {
    /// Parses a `field:direction` ordering clause, constraining the field to `allowed`.
    ///
    /// Malformed clauses, unknown fields and unknown directions all silently fall back to the
    /// default ordering instead of failing the request.
    pub fn parse(raw: Option<&str>, allowed: &[&str]) -> Self {
        if let Some(raw) = raw {
            if let Some((field, direction)) = raw.split_once(':') {
                let direction = if direction.eq_ignore_ascii_case("ASC") {
                    Some(OrderDirection::Asc)
                } else if direction.eq_ignore_ascii_case("DESC") {
                    Some(OrderDirection::Desc)
                } else {
                    None
                };
                if let Some(direction) = direction {
                    if allowed.contains(&field) {
                        return Self { field: field.to_owned(), direction };
                    }
                }
            }
        }
        Self::default()
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }
}

impl Default for OrderBy {
    /// Newest entries first.
    fn default() -> Self {
        Self { field: "createdAt".to_owned(), direction: OrderDirection::Desc }
    }
}

/// Description of the window a `Page` covers within the full listing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    /// The limit the page was computed with.
    pub limit: u32,

    /// The offset the page was computed with.
    pub offset: u32,

    /// Total number of entries matching the listing's filters.
    pub total: u64,

    /// Whether more entries exist past this page.
    pub has_more: bool,
}

impl Pagination {
    /// Computes the pagination descriptor for a page fetched with `params` out of `total`
    /// matching entries.
    pub fn new(params: PageParams, total: u64) -> Self {
        Self {
            limit: params.limit,
            offset: params.offset,
            total,
            has_more: u64::from(params.offset) + u64::from(params.limit) < total,
        }
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// The entries in this page, already ordered.
    pub items: Vec<T>,

    /// Where this page falls within the full listing.
    pub pagination: Pagination,
}
