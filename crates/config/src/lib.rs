//! # dataset-config
//!
//! Dataset configuration record, validation and normalization rules, the
//! connection URL builder, and the layered loader (file, overrides, env).
//! This crate depends on `shared` only.

/// Connection URL derivation.
pub mod connection;
/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Typed view over the free-form options map.
pub mod options;
/// Configuration record, validation, and normalization.
pub mod schema;

pub use connection::{CONNECTION_PORT, ConnectionScheme, build_connection_url};
pub use env::{DatasetEnv, EnvParseError, apply_env_overrides, merge_env_overrides};
pub use load::{
    load_dataset_config_from_path, load_dataset_config_from_sources,
    load_unvalidated_dataset_config, to_pretty_json, to_pretty_toml,
};
pub use options::{OPTION_SSL, OPTION_STORAGE, SSL_ENABLED, STORAGE_TEMPORARY, StorageMedium};
pub use schema::{
    DEFAULT_MOUNT_PATH, DatasetConfig, InvalidConfig, TEMPORARY_STORAGE_MAX_REPLICAS,
    ValidatedDatasetConfig, parse_dataset_config_json, parse_dataset_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
