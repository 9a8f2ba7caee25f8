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

//! Common data types for the business layer of the service.
//!
//! Domain-specific types live in the server crate; this module only carries the types that the
//! generic layers need to know about.

use serde::Serialize;

mod emailaddress;
pub use emailaddress::EmailAddress;

/// Model errors.  Any invalid data produces one of these.
#[derive(Debug, PartialEq, Serialize, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;
