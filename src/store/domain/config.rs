//! Connection configuration for a task adapter.

use super::{DatabaseName, StoreConfigError, StoreUrl};
use serde::{Deserialize, Serialize};

/// Where the adapter connects and which database it uses.
///
/// When `database` is `None` the driver resolves the database named by the
/// URL path (for example `mongodb://localhost:27017/inventory`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    url: StoreUrl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<DatabaseName>,
}

impl StoreConfig {
    /// Environment variable holding the connection URL.
    pub const URL_VAR: &'static str = "DOCTASK_URL";

    /// Environment variable holding an explicit database name.
    pub const DATABASE_VAR: &'static str = "DOCTASK_DATABASE";

    /// Creates a configuration for `url` with no explicit database.
    #[must_use]
    pub const fn new(url: StoreUrl) -> Self {
        Self {
            url,
            database: None,
        }
    }

    /// Sets the database used instead of the URL's default.
    #[must_use]
    pub fn with_database(mut self, database: DatabaseName) -> Self {
        self.database = Some(database);
        self
    }

    /// Returns the connection URL.
    #[must_use]
    pub const fn url(&self) -> &StoreUrl {
        &self.url
    }

    /// Returns the explicit database, if configured.
    #[must_use]
    pub const fn database(&self) -> Option<&DatabaseName> {
        self.database.as_ref()
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`StoreConfig::from_lookup`].
    pub fn from_env() -> Result<Self, StoreConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through a variable lookup function.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::MissingVariable`] when the URL variable
    /// is unset and [`StoreConfigError::Domain`] when a value fails
    /// validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let url = present(Self::URL_VAR)
            .ok_or(StoreConfigError::MissingVariable(Self::URL_VAR))?;
        let mut config = Self::new(StoreUrl::new(url)?);
        if let Some(database) = present(Self::DATABASE_VAR) {
            config = config.with_database(DatabaseName::new(database.trim())?);
        }
        Ok(config)
    }

    /// Parses configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreConfigError::Malformed`] when the document does not
    /// match the expected shape or a value fails validation.
    pub fn from_json(document: &str) -> Result<Self, StoreConfigError> {
        Ok(serde_json::from_str(document)?)
    }
}
