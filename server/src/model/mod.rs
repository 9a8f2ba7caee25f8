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

//! Data types for the fleet domain.

mod accesstoken;
pub use accesstoken::AccessToken;
mod driver;
pub use driver::{Driver, DriverStatus, License};
mod freight;
pub use freight::{Freight, FreightStatus, Price};
mod page;
pub(crate) use page::validate_search;
pub use page::{OrderBy, OrderDirection, Page, PageParams, Pagination};
mod passwords;
pub use passwords::{HashedPassword, Password};
mod session;
pub use session::Session;
mod truck;
pub use truck::{Plate, Truck};
mod user;
pub use user::{Role, User};
