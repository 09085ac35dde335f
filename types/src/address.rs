//! Account identifier type with `rbt_` prefix.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger account identifier, always prefixed with `rbt_`.
///
/// The same identifier space is used on every chain instance, so a bridge
/// recipient is resolvable on the destination ledger without translation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// The standard prefix for all account identifiers.
    pub const PREFIX: &'static str = "rbt_";

    /// Create a new account identifier from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `rbt_`. Use [`AccountId::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "account id must start with rbt_");
        Self(s)
    }

    /// Parse an untrusted string into an account identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let id = Self(raw.into());
        if id.is_valid() {
            Ok(id)
        } else {
            Err(TypesError::InvalidAccount(id.0))
        }
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this identifier is well-formed: the prefix followed by at
    /// least one ASCII alphanumeric or underscore character.
    pub fn is_valid(&self) -> bool {
        match self.0.strip_prefix(Self::PREFIX) {
            Some(rest) => {
                !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
