//! Sensitive-data categories
//!
//! A category classifies one kind of regulated identifier (phone number,
//! domain, MAC address, ...). Keys are globally unique and immutable once
//! referenced by stored mappings, so they are validated at construction and
//! at deserialization time.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]{1,64}$").expect("valid category key pattern"));

/// A validated category key
///
/// Keys are lowercase `[a-z0-9_]+`. Well-known keys are provided as
/// constructors; administrators may define further categories through the
/// rule-set catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Create a category from a key, validating the key format
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();

        if !KEY_PATTERN.is_match(&key) {
            return Err(Error::InvalidCategory(key));
        }

        Ok(Self(key))
    }

    pub fn ipv4_addr() -> Self {
        Self("ipv4_addr".to_string())
    }

    pub fn mac_address() -> Self {
        Self("mac_address".to_string())
    }

    pub fn username() -> Self {
        Self("username".to_string())
    }

    pub fn domain() -> Self {
        Self("domain".to_string())
    }

    pub fn phone_num() -> Self {
        Self("phone_num".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}
