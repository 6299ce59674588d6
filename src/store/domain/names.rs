//! Validated names and locators for the document store.

use super::StoreDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a collection inside the configured database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a validated collection name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreDomainError::InvalidCollectionName`] when the name is
    /// empty, contains `$` or a NUL byte, or targets the reserved `system.`
    /// namespace.
    pub fn new(value: impl Into<String>) -> Result<Self, StoreDomainError> {
        let raw = value.into();
        let is_valid = !raw.is_empty()
            && !raw.contains(['$', '\0'])
            && !raw.starts_with("system.");
        if !is_valid {
            return Err(StoreDomainError::InvalidCollectionName(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the collection name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CollectionName {
    type Error = StoreDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CollectionName> for String {
    fn from(value: CollectionName) -> Self {
        value.0
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field path used by distinct-value lookups.
///
/// Dotted paths such as `address.city` are passed to the driver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey(String);

impl FieldKey {
    /// Creates a validated field key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreDomainError::InvalidFieldKey`] when the key is empty,
    /// starts with `$`, or contains a NUL byte.
    pub fn new(value: impl Into<String>) -> Result<Self, StoreDomainError> {
        let raw = value.into();
        if raw.is_empty() || raw.starts_with('$') || raw.contains('\0') {
            return Err(StoreDomainError::InvalidFieldKey(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the key as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the key into its dotted path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the database that collections are resolved against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Longest database name the server accepts, in bytes.
    const MAX_LEN: usize = 63;

    /// Creates a validated database name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreDomainError::InvalidDatabaseName`] when the name is
    /// empty, longer than 63 bytes, or contains whitespace, a NUL byte, or
    /// any of `/\."$*<>:|?`.
    pub fn new(value: impl Into<String>) -> Result<Self, StoreDomainError> {
        let raw = value.into();
        let has_reserved = raw.chars().any(|ch| {
            ch.is_whitespace()
                || matches!(
                    ch,
                    '/' | '\\' | '.' | '"' | '$' | '*' | '<' | '>' | ':' | '|' | '?' | '\0'
                )
        });
        if raw.is_empty() || raw.len() > Self::MAX_LEN || has_reserved {
            return Err(StoreDomainError::InvalidDatabaseName(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the database name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = StoreDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DatabaseName> for String {
    fn from(value: DatabaseName) -> Self {
        value.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection string handed to the driver.
///
/// Only emptiness is checked here. Scheme, host, credential, and option
/// parsing belong to the driver, which reports malformed URLs as connect
/// failures.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoreUrl(String);

impl StoreUrl {
    /// Creates a connection URL, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreDomainError::EmptyUrl`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, StoreDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StoreDomainError::EmptyUrl);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the URL as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StoreUrl {
    type Error = StoreDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StoreUrl> for String {
    fn from(value: StoreUrl) -> Self {
        value.0
    }
}

// URLs may embed credentials, so debug output never shows them.
impl fmt::Debug for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreUrl").field(&"<redacted>").finish()
    }
}
