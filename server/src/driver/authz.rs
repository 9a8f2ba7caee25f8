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

//! Access policy for the fleet entities.

use crate::model::Role;
use fleet_core::driver::{DriverError, DriverResult};

/// The kinds of entities the access policy knows about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Resource {
    Users,
    Drivers,
    Trucks,
}

/// The operations that can be attempted against a resource.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Verifies that a caller with `role` may perform `operation` against `resource`.
///
/// Any authenticated caller can read every entity and manage user accounts, but mutating
/// drivers and trucks requires administrator privileges.  This runs before any input
/// validation or database access so that unprivileged callers cannot probe for data.
pub(crate) fn check(role: Role, resource: Resource, operation: Operation) -> DriverResult<()> {
    let allowed = match (resource, operation) {
        (Resource::Users, _) => true,
        (_, Operation::Read) => true,
        (_, _) => role == Role::Admin,
    };

    if allowed {
        Ok(())
    } else {
        Err(DriverError::Forbidden("Administrator privileges required".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_all_combinations() {
        use Operation::*;
        use Resource::*;

        for operation in [Create, Read, Update, Delete] {
            for resource in [Users, Drivers, Trucks] {
                // Administrators can do everything.
                check(Role::Admin, resource, operation).unwrap();

                let allowed = resource == Users || operation == Read;
                let result = check(Role::Driver, resource, operation);
                if allowed {
                    result.unwrap();
                } else {
                    match result {
                        Err(DriverError::Forbidden(msg)) => {
                            assert!(msg.contains("Administrator"))
                        }
                        e => panic!("{:?}", e),
                    }
                }
            }
        }
    }
}
