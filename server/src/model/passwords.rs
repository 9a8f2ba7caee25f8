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

//! Data types to represent passwords in their hashed and unhashed forms.

use fleet_core::model::{ModelError, ModelResult};
use serde::Deserialize;

/// Cost factor for the bcrypt algorithm.
const BCRYPT_COST: u32 = 10;

/// Minimum length of a raw password in bytes.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum length of a raw password in bytes, as imposed by bcrypt.
const MAX_PASSWORD_LENGTH: usize = 56;

/// Represents a plain-text password.
///
/// Instances of this type never leave the process: they are either verified against a stored
/// hash or consumed to produce a new `HashedPassword`.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Creates a new password from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.len() < MIN_PASSWORD_LENGTH {
            return Err(ModelError(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        if s.len() > MAX_PASSWORD_LENGTH {
            return Err(ModelError(format!(
                "Password must be at most {} characters long",
                MAX_PASSWORD_LENGTH
            )));
        }

        Ok(Self(s))
    }

    /// Validates the password and hashes it for persistence.
    pub fn validate_and_hash(self) -> ModelResult<HashedPassword> {
        // Rerun the checks in case the password was deserialized and thus bypassed `new`.
        let password = Password::new(self.0)?;

        match bcrypt::hash(&password.0, BCRYPT_COST) {
            Ok(hash) => Ok(HashedPassword(hash)),
            Err(e) => Err(ModelError(format!("Cannot hash password: {}", e))),
        }
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scrubbed password")
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for Password {
    /// Creates a new password from a hardcoded string, which must be valid.
    fn from(s: &'static str) -> Self {
        Password::new(s).expect("Hardcoded passwords for testing must be valid")
    }
}

/// Represents a password hashed with bcrypt, suitable for persistence.
#[derive(Clone, PartialEq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Creates a new hashed password from a raw hash `s`.
    pub(crate) fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Returns a string view of the hashed password for persistence purposes.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Checks whether the plain-text `password` matches this hash.
    pub fn verify(&self, password: &Password) -> ModelResult<bool> {
        match bcrypt::verify(&password.0, &self.0) {
            Ok(ok) => Ok(ok),
            Err(e) => Err(ModelError(format!("Cannot verify password: {}", e))),
        }
    }
}

impl std::fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scrubbed hashed password")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_length_limits() {
        Password::new("12345").unwrap_err();
        Password::new("123456").unwrap();
        Password::new("x".repeat(MAX_PASSWORD_LENGTH)).unwrap();
        Password::new("x".repeat(MAX_PASSWORD_LENGTH + 1)).unwrap_err();
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = Password::from("the-password").validate_and_hash().unwrap();
        assert!(hash.verify(&Password::from("the-password")).unwrap());
        assert!(!hash.verify(&Password::from("not-the-password")).unwrap());
    }

    #[test]
    fn test_password_deserialized_values_are_validated_on_hash() {
        let password: Password = serde_json::from_str("\"abc\"").unwrap();
        password.validate_and_hash().unwrap_err();
    }

    #[test]
    fn test_password_debug_is_scrubbed() {
        assert_eq!("scrubbed password", format!("{:?}", Password::from("super-secret")));
        let hash = Password::from("super-secret").validate_and_hash().unwrap();
        assert_eq!("scrubbed hashed password", format!("{:?}", hash));
    }
}
