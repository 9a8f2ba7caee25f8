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

//! The `AccessToken` data type.

use fleet_core::model::{ModelError, ModelResult};
use rand::Rng;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};

/// Length of all access tokens in characters.
const TOKEN_LENGTH: usize = 64;

/// Characters used to generate access tokens.
const TOKEN_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Represents an access token granted to a logged-in user.
#[derive(Clone, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates a new access token from an untrusted string `s`, making sure it has the right
    /// format.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.len() != TOKEN_LENGTH {
            return Err(ModelError("Invalid access token".to_owned()));
        }
        for ch in s.chars() {
            if !ch.is_ascii_alphanumeric() {
                return Err(ModelError("Invalid access token".to_owned()));
            }
        }

        Ok(Self(s))
    }

    /// Generates a new random access token.
    pub(crate) fn generate() -> Self {
        let mut rng = rand::rng();
        let mut s = String::with_capacity(TOKEN_LENGTH);
        for _ in 0..TOKEN_LENGTH {
            s.push(char::from(TOKEN_CHARS[rng.random_range(0..TOKEN_CHARS.len())]));
        }
        Self(s)
    }

    /// Returns a string view of the access token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scrubbed access token")
    }
}

/// Visitor to deserialize an `AccessToken` from a string.
struct AccessTokenVisitor;

impl Visitor<'_> for AccessTokenVisitor {
    type Value = AccessToken;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an access token")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        AccessToken::new(v).map_err(|e| E::custom(format!("{}", e)))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        AccessToken::new(v).map_err(|e| E::custom(format!("{}", e)))
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(AccessTokenVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_accesstoken_new_ok() {
        let raw = "a".repeat(TOKEN_LENGTH);
        assert_eq!(&raw, AccessToken::new(raw.clone()).unwrap().as_str());
    }

    #[test]
    fn test_accesstoken_new_error() {
        AccessToken::new("").unwrap_err();
        AccessToken::new("a".repeat(TOKEN_LENGTH - 1)).unwrap_err();
        AccessToken::new("a".repeat(TOKEN_LENGTH + 1)).unwrap_err();

        let mut raw = "a".repeat(TOKEN_LENGTH - 1);
        raw.push('*');
        AccessToken::new(raw).unwrap_err();
    }

    #[test]
    fn test_accesstoken_generate_is_valid_and_unique() {
        let mut seen: HashSet<String> = HashSet::new();
        for _ in 0..1000 {
            let token = AccessToken::generate();
            AccessToken::new(token.as_str()).unwrap();
            assert!(seen.insert(token.as_str().to_owned()), "Duplicate token generated");
        }
    }

    #[test]
    fn test_accesstoken_deserialize_validates() {
        let raw = "a".repeat(TOKEN_LENGTH);
        let token: AccessToken = serde_json::from_str(&format!("\"{}\"", raw)).unwrap();
        assert_eq!(&raw, token.as_str());

        let err = serde_json::from_str::<AccessToken>("\"short\"").unwrap_err();
        assert!(err.to_string().contains("Invalid access token"));
    }

    #[test]
    fn test_accesstoken_debug_is_scrubbed() {
        assert_eq!("scrubbed access token", format!("{:?}", AccessToken::generate()));
    }
}
