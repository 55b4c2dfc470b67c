//! Dataset configuration record, validation, and normalization.
//!
//! Validation is ordered and short-circuiting:
//! 1. `name` must be non-empty.
//! 2. `replicas` must be non-negative.
//! 3. `mountPath` is defaulted and its leading `//` rewritten.
//! 4. `storage = "temporary"` rejects `replicas > 1`.
//!
//! A failure at step 1 or 2 leaves the record untouched. A failure at step 4
//! happens after the mount path was already rewritten.

use crate::options::StorageMedium;
use dataset_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mount path applied when the record leaves it empty.
pub const DEFAULT_MOUNT_PATH: &str = "/mnt/data";

/// Highest replica count allowed on temporary storage.
pub const TEMPORARY_STORAGE_MAX_REPLICAS: i64 = 1;

const DOUBLE_SLASH: &str = "//";

/// Dataset configuration as supplied by the caller.
///
/// Every field may violate its invariant until
/// [`DatasetConfig::validate_and_normalize`] succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DatasetConfig {
    /// Logical resource name. Required.
    pub name: String,
    /// Logical grouping. May be empty.
    pub namespace: String,
    /// Filesystem mount path. Defaults to [`DEFAULT_MOUNT_PATH`].
    pub mount_path: String,
    /// Desired replica count. Must be non-negative.
    pub replicas: i64,
    /// Free-form settings; `storage` and `ssl` are recognized, the rest pass through.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl DatasetConfig {
    /// Create a record with a name and namespace and zero values elsewhere.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Set the replica count.
    #[must_use]
    pub const fn with_replicas(mut self, replicas: i64) -> Self {
        self.replicas = replicas;
        self
    }

    /// Set the mount path.
    #[must_use]
    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    /// Insert a single option entry.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Validate the record and normalize `mount_path` in place.
    ///
    /// Calling this again on an already-normalized record succeeds and leaves
    /// it unchanged, except for mount paths that still begin with `//`.
    pub fn validate_and_normalize(&mut self) -> Result<(), InvalidConfig> {
        self.validate_name()?;
        self.validate_replicas()?;
        normalize_mount_path(&mut self.mount_path);
        self.validate_storage_replicas()?;

        tracing::debug!(
            name = %self.name,
            namespace = %self.namespace,
            mount_path = %self.mount_path,
            replicas = self.replicas,
            "dataset config validated"
        );
        Ok(())
    }

    /// Consume the record and return a validated, normalized wrapper.
    pub fn into_validated(mut self) -> Result<ValidatedDatasetConfig, InvalidConfig> {
        self.validate_and_normalize()?;
        Ok(ValidatedDatasetConfig { raw: self })
    }

    fn validate_name(&self) -> Result<(), InvalidConfig> {
        if self.name.is_empty() {
            return Err(InvalidConfig::EmptyName);
        }
        Ok(())
    }

    const fn validate_replicas(&self) -> Result<(), InvalidConfig> {
        if self.replicas < 0 {
            return Err(InvalidConfig::NegativeReplicas {
                replicas: self.replicas,
            });
        }
        Ok(())
    }

    fn validate_storage_replicas(&self) -> Result<(), InvalidConfig> {
        if self.storage_medium() == Some(StorageMedium::Temporary)
            && self.replicas > TEMPORARY_STORAGE_MAX_REPLICAS
        {
            return Err(InvalidConfig::TemporaryStorageReplicas {
                replicas: self.replicas,
            });
        }
        Ok(())
    }
}

/// Default an empty mount path and rewrite the first `//` of a `//`-prefixed one.
///
/// Only one substitution happens per call: `///data` becomes `//data`.
fn normalize_mount_path(mount_path: &mut String) {
    if mount_path.is_empty() {
        mount_path.push_str(DEFAULT_MOUNT_PATH);
        tracing::debug!(mount_path = DEFAULT_MOUNT_PATH, "defaulted empty mount path");
    }

    if mount_path.starts_with(DOUBLE_SLASH) {
        let original = mount_path.clone();
        mount_path.replace_range(..DOUBLE_SLASH.len(), "/");
        tracing::debug!(
            from = %original,
            to = %mount_path,
            "rewrote double-slash mount path prefix"
        );
    }
}

/// Validated config wrapper; derefs to the normalized record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedDatasetConfig {
    raw: DatasetConfig,
}

impl ValidatedDatasetConfig {
    /// Borrow the normalized record.
    #[must_use]
    pub const fn config(&self) -> &DatasetConfig {
        &self.raw
    }

    /// Consume the wrapper and return the normalized record.
    #[must_use]
    pub fn into_inner(self) -> DatasetConfig {
        self.raw
    }
}

impl AsRef<DatasetConfig> for ValidatedDatasetConfig {
    fn as_ref(&self) -> &DatasetConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedDatasetConfig {
    type Target = DatasetConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl TryFrom<DatasetConfig> for ValidatedDatasetConfig {
    type Error = InvalidConfig;

    fn try_from(config: DatasetConfig) -> Result<Self, Self::Error> {
        config.into_validated()
    }
}

/// Rejection reported by [`DatasetConfig::validate_and_normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidConfig {
    /// `name` was empty.
    EmptyName,
    /// `replicas` was negative.
    NegativeReplicas {
        /// Value provided.
        replicas: i64,
    },
    /// `storage = "temporary"` was combined with more than one replica.
    TemporaryStorageReplicas {
        /// Value provided.
        replicas: i64,
    },
}

impl InvalidConfig {
    /// Fixed human-readable message for this rejection.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyName => "name cannot be empty",
            Self::NegativeReplicas { .. } => "replicas must be non-negative",
            Self::TemporaryStorageReplicas { .. } => {
                "temporary storage does not support replicas > 1"
            },
        }
    }

    /// Config field the rejection is attributed to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::NegativeReplicas { .. } | Self::TemporaryStorageReplicas { .. } => "replicas",
        }
    }
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.message())
    }
}

impl std::error::Error for InvalidConfig {}

impl From<InvalidConfig> for ErrorEnvelope {
    fn from(error: InvalidConfig) -> Self {
        let envelope = Self::expected(ErrorCode::invalid_config(), error.message())
            .with_metadata("field", error.field());

        match error {
            InvalidConfig::EmptyName => envelope,
            InvalidConfig::NegativeReplicas { replicas } => {
                envelope.with_metadata("replicas", replicas.to_string())
            },
            InvalidConfig::TemporaryStorageReplicas { replicas } => envelope
                .with_metadata("replicas", replicas.to_string())
                .with_metadata("storage", crate::options::STORAGE_TEMPORARY),
        }
    }
}

/// Parse a dataset config from a JSON string, applying validation and normalization.
pub fn parse_dataset_config_json(input: &str) -> Result<ValidatedDatasetConfig, ErrorEnvelope> {
    let config: DatasetConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.into_validated().map_err(Into::into)
}

/// Parse a dataset config from a TOML string, applying validation and normalization.
pub fn parse_dataset_config_toml(input: &str) -> Result<ValidatedDatasetConfig, ErrorEnvelope> {
    let config: DatasetConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.into_validated().map_err(Into::into)
}
