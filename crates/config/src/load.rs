//! Config loading helpers (env + file + overrides).
//!
//! The loader owns the merge order and surfaces user-facing failures as
//! typed `ErrorEnvelope`s. Validation runs exactly once, on the merged record.

use crate::env::{DatasetEnv, merge_env_overrides};
use crate::schema::{DatasetConfig, ValidatedDatasetConfig};
use dataset_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the dataset config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`DatasetEnv`)
/// - overrides JSON (partial config; `options` merged key by key)
/// - config JSON (file content)
/// - defaults (`DatasetConfig::default()`)
pub fn load_dataset_config_from_sources(
    config_json: Option<&str>,
    overrides_json: Option<&str>,
    env: &DatasetEnv,
) -> Result<ValidatedDatasetConfig> {
    let config = match config_json {
        None => DatasetConfig::default(),
        Some(input) => parse_config_unvalidated(input, ConfigFormat::Json)?,
    };

    let merged = merge_sources(config, overrides_json, env)?;
    validate_merged(merged)
}

/// Load the dataset config from an optional file path.
pub fn load_dataset_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &DatasetEnv,
) -> Result<ValidatedDatasetConfig> {
    let merged = load_unvalidated_dataset_config(config_path, overrides_json, env)?;
    validate_merged(merged)
}

/// Merge every source like [`load_dataset_config_from_path`] but skip validation.
///
/// Used where the raw merged record is wanted, e.g. to derive a connection
/// URL from a record that would be rejected.
pub fn load_unvalidated_dataset_config(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &DatasetEnv,
) -> Result<DatasetConfig> {
    let config = match config_path {
        None => DatasetConfig::default(),
        Some(path) => {
            let config_text = read_config_file(path)?;
            let format = detect_config_format(path)?;
            parse_config_unvalidated(&config_text, format)?
        },
    };

    merge_sources(config, overrides_json, env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &DatasetConfig) -> Result<String> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &DatasetConfig) -> Result<String> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn merge_sources(
    mut config: DatasetConfig,
    overrides_json: Option<&str>,
    env: &DatasetEnv,
) -> Result<DatasetConfig> {
    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        apply_overrides(&mut config, overrides);
    }

    merge_env_overrides(&mut config, env);
    Ok(config)
}

fn validate_merged(config: DatasetConfig) -> Result<ValidatedDatasetConfig> {
    let name = config.name.clone();
    config.into_validated().map_err(|error| {
        tracing::warn!(
            name = %name,
            field = error.field(),
            reason = %error,
            "dataset config rejected"
        );
        error.into()
    })
}

fn parse_config_unvalidated(input: &str, format: ConfigFormat) -> Result<DatasetConfig> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn parse_overrides_json(input: &str) -> Result<DatasetConfigOverrides> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid overrides JSON: {error}"),
        )
        .with_metadata("source", "overrides")
    })
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
struct DatasetConfigOverrides {
    name: Option<String>,
    namespace: Option<String>,
    mount_path: Option<String>,
    replicas: Option<i64>,
    options: BTreeMap<String, String>,
}

fn apply_overrides(config: &mut DatasetConfig, overrides: DatasetConfigOverrides) {
    let DatasetConfigOverrides {
        name,
        namespace,
        mount_path,
        replicas,
        options,
    } = overrides;

    if let Some(name) = name {
        config.name = name;
    }
    if let Some(namespace) = namespace {
        config.namespace = namespace;
    }
    if let Some(mount_path) = mount_path {
        config.mount_path = mount_path;
    }
    if let Some(replicas) = replicas {
        config.replicas = replicas;
    }
    config.options.extend(options);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OPTION_SSL, OPTION_STORAGE};
    use crate::schema::DEFAULT_MOUNT_PATH;
    use std::error::Error;

    #[test]
    fn override_precedence_is_deterministic() -> Result<(), Box<dyn Error>> {
        let config_json = r#"{ "name": "from-file", "namespace": "ns", "replicas": 1 }"#;
        let overrides_json = r#"{ "name": "from-overrides", "replicas": 2 }"#;
        let env = DatasetEnv {
            name: Some("from-env".to_owned()),
            ..DatasetEnv::default()
        };

        let config =
            load_dataset_config_from_sources(Some(config_json), Some(overrides_json), &env)?;
        assert_eq!(config.name, "from-env");
        assert_eq!(config.replicas, 2);
        assert_eq!(config.namespace, "ns");
        Ok(())
    }

    #[test]
    fn override_options_merge_key_by_key() -> Result<(), Box<dyn Error>> {
        let config_json = r#"{
          "name": "db",
          "options": { "storage": "ssd", "tier": "gold" }
        }"#;
        let overrides_json = r#"{ "options": { "storage": "temporary", "ssl": "true" } }"#;

        let config = load_dataset_config_from_sources(
            Some(config_json),
            Some(overrides_json),
            &DatasetEnv::default(),
        )?;
        assert_eq!(config.option(OPTION_STORAGE), Some("temporary"));
        assert_eq!(config.option(OPTION_SSL), Some("true"));
        assert_eq!(config.option("tier"), Some("gold"));
        Ok(())
    }

    #[test]
    fn defaults_alone_are_rejected_for_missing_name() -> Result<(), Box<dyn Error>> {
        let error = load_dataset_config_from_sources(None, None, &DatasetEnv::default()).err();
        let envelope = error.ok_or_else(|| std::io::Error::other("expected rejection"))?;

        assert_eq!(envelope.code, ErrorCode::invalid_config());
        assert_eq!(envelope.message, "name cannot be empty");
        assert_eq!(
            envelope.metadata.get("field").map(String::as_str),
            Some("name")
        );
        Ok(())
    }

    #[test]
    fn invalid_file_value_overridden_by_valid_env_succeeds() -> Result<(), Box<dyn Error>> {
        let config_json = r#"{ "name": "db", "replicas": -4 }"#;
        let env = DatasetEnv {
            replicas: Some(0),
            ..DatasetEnv::default()
        };

        let config = load_dataset_config_from_sources(Some(config_json), None, &env)?;
        assert_eq!(config.replicas, 0);
        assert_eq!(config.mount_path, DEFAULT_MOUNT_PATH);
        Ok(())
    }

    #[test]
    fn unknown_override_fields_are_rejected() -> Result<(), Box<dyn Error>> {
        let error = load_dataset_config_from_sources(
            Some(r#"{ "name": "db" }"#),
            Some(r#"{ "replica": 3 }"#),
            &DatasetEnv::default(),
        )
        .err();
        let envelope = error.ok_or_else(|| std::io::Error::other("expected parse error"))?;

        assert_eq!(envelope.code, ErrorCode::new("config", "invalid_json"));
        assert_eq!(
            envelope.metadata.get("source").map(String::as_str),
            Some("overrides")
        );
        Ok(())
    }

    #[test]
    fn unvalidated_load_keeps_raw_values() -> Result<(), Box<dyn Error>> {
        let env = DatasetEnv {
            name: Some("ginkgo-test".to_owned()),
            replicas: Some(-1),
            ..DatasetEnv::default()
        };
        let config = load_unvalidated_dataset_config(None, None, &env)?;

        assert_eq!(config.replicas, -1);
        assert_eq!(config.mount_path, "");
        Ok(())
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let error = detect_config_format(Path::new("dataset.yaml")).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
    }

    #[test]
    fn extensionless_path_is_json() -> Result<(), Box<dyn Error>> {
        assert_eq!(
            detect_config_format(Path::new("dataset"))?,
            ConfigFormat::Json
        );
        assert_eq!(
            detect_config_format(Path::new("dataset.TOML"))?,
            ConfigFormat::Toml
        );
        Ok(())
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn Error>> {
        let config = load_dataset_config_from_sources(
            Some(r#"{ "name": "db", "options": { "b": "2", "a": "1" } }"#),
            None,
            &DatasetEnv::default(),
        )?;
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;

        assert_eq!(first, second);
        assert!(first.ends_with('\n'));
        assert!(first.find("\"a\"") < first.find("\"b\""));
        Ok(())
    }

    #[test]
    fn pretty_toml_parses_back() -> Result<(), Box<dyn Error>> {
        let config = load_dataset_config_from_sources(
            Some(r#"{ "name": "db", "namespace": "prod", "options": { "ssl": "true" } }"#),
            None,
            &DatasetEnv::default(),
        )?;
        let toml_text = to_pretty_toml(&config)?;
        let parsed: DatasetConfig = toml::from_str(&toml_text)?;

        assert_eq!(&parsed, config.config());
        Ok(())
    }
}
