//! Typed view over the free-form `options` map.
//!
//! Only two keys carry meaning: `storage` and `ssl`. Matching is exact and
//! case-sensitive. Every other entry passes through untouched.

use crate::schema::DatasetConfig;
use dataset_shared::redact_if_secret;
use std::collections::BTreeMap;
use std::fmt;

/// Option key selecting the storage medium.
pub const OPTION_STORAGE: &str = "storage";
/// Option key enabling TLS for the connection URL.
pub const OPTION_SSL: &str = "ssl";
/// `storage` value marking ephemeral storage.
pub const STORAGE_TEMPORARY: &str = "temporary";
/// `ssl` value that enables TLS. Any other value leaves it disabled.
pub const SSL_ENABLED: &str = "true";

/// Storage medium requested through the `storage` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMedium<'a> {
    /// Ephemeral storage; limited to a single replica.
    Temporary,
    /// Any other value, carried verbatim.
    Other(&'a str),
}

impl<'a> StorageMedium<'a> {
    /// Classify a raw `storage` option value.
    #[must_use]
    pub fn parse(value: &'a str) -> Self {
        if value == STORAGE_TEMPORARY {
            Self::Temporary
        } else {
            Self::Other(value)
        }
    }

    /// Raw option value.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        match *self {
            Self::Temporary => STORAGE_TEMPORARY,
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for StorageMedium<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl DatasetConfig {
    /// Look up a single option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Storage medium from the `storage` option, if present.
    #[must_use]
    pub fn storage_medium(&self) -> Option<StorageMedium<'_>> {
        self.option(OPTION_STORAGE).map(StorageMedium::parse)
    }

    /// True only when `ssl` is exactly `"true"`.
    #[must_use]
    pub fn ssl_enabled(&self) -> bool {
        self.option(OPTION_SSL) == Some(SSL_ENABLED)
    }

    /// Options with values of secret-looking keys replaced by a marker.
    #[must_use]
    pub fn redacted_options(&self) -> BTreeMap<String, String> {
        self.options
            .iter()
            .map(|(key, value)| (key.clone(), redact_if_secret(key, value)))
            .collect()
    }
}
