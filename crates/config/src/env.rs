//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present but malformed fails
//! the load instead of being ignored. Secret-looking values are redacted in
//! error metadata.

use crate::options::{OPTION_SSL, OPTION_STORAGE};
use crate::schema::{DatasetConfig, ValidatedDatasetConfig};
use dataset_shared::{ErrorCode, ErrorEnvelope, REDACTED, is_secret_key};
use std::collections::BTreeMap;
use std::env::VarError;
use std::fmt;

/// Env var: dataset name.
pub const ENV_NAME: &str = "DSC_NAME";
/// Env var: dataset namespace (may be set to an empty string).
pub const ENV_NAMESPACE: &str = "DSC_NAMESPACE";
/// Env var: mount path.
pub const ENV_MOUNT_PATH: &str = "DSC_MOUNT_PATH";
/// Env var: replica count.
pub const ENV_REPLICAS: &str = "DSC_REPLICAS";
/// Env var: `storage` option.
pub const ENV_STORAGE: &str = "DSC_STORAGE";
/// Env var: `ssl` option as a loose boolean (`1`, `yes`, `on` count as true),
/// written to the map as `"true"`/`"false"`; the map itself matches `"true"` exactly.
pub const ENV_SSL: &str = "DSC_SSL";
/// Env var: extra options as CSV `key=value` pairs.
pub const ENV_OPTIONS: &str = "DSC_OPTIONS";

/// Every env var the loader reads.
pub const ENV_VARS: [&str; 7] = [
    ENV_NAME,
    ENV_NAMESPACE,
    ENV_MOUNT_PATH,
    ENV_REPLICAS,
    ENV_STORAGE,
    ENV_SSL,
    ENV_OPTIONS,
];

const MAX_CSV_ITEMS: usize = 1024;

/// Typed env-derived overrides for `DatasetConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetEnv {
    /// Override for `name`.
    pub name: Option<String>,
    /// Override for `namespace`.
    pub namespace: Option<String>,
    /// Override for `mountPath`.
    pub mount_path: Option<String>,
    /// Override for `replicas`.
    pub replicas: Option<i64>,
    /// Override for `options.storage`.
    pub storage: Option<String>,
    /// Override for `options.ssl`.
    pub ssl: Option<bool>,
    /// Entries merged into `options` key by key.
    pub options: Option<BTreeMap<String, String>>,
}

impl DatasetEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            name: parse_optional_trimmed_string(map, ENV_NAME)?,
            namespace: parse_optional_string_allow_empty(map, ENV_NAMESPACE),
            mount_path: parse_optional_trimmed_string(map, ENV_MOUNT_PATH)?,
            replicas: parse_optional_i64(map, ENV_REPLICAS)?,
            storage: parse_optional_trimmed_string(map, ENV_STORAGE)?,
            ssl: parse_optional_bool(map, ENV_SSL)?,
            options: parse_optional_csv_options(map, ENV_OPTIONS)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, VarError>,
    ) -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for var in ENV_VARS {
            match lookup(var) {
                Ok(value) => {
                    map.insert(var.to_owned(), value);
                },
                Err(VarError::NotPresent) => {},
                Err(VarError::NotUnicode(_)) => return Err(EnvParseError::NotUnicode { var }),
            }
        }

        Self::from_map(&map)
    }

    /// True when no variable was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Apply env overrides to a base config (env wins over file/default values)
/// and validate the result.
pub fn apply_env_overrides(
    base: DatasetConfig,
    env: &DatasetEnv,
) -> Result<ValidatedDatasetConfig, ErrorEnvelope> {
    let mut config = base;
    merge_env_overrides(&mut config, env);
    config.into_validated().map_err(Into::into)
}

/// Apply env overrides in place without validating.
///
/// `DSC_OPTIONS` entries are merged first so the dedicated `DSC_STORAGE` and
/// `DSC_SSL` variables win over the same keys in the CSV.
pub fn merge_env_overrides(config: &mut DatasetConfig, env: &DatasetEnv) {
    set_clone(&mut config.name, env.name.as_ref());
    set_clone(&mut config.namespace, env.namespace.as_ref());
    set_clone(&mut config.mount_path, env.mount_path.as_ref());
    if let Some(replicas) = env.replicas {
        config.replicas = replicas;
    }

    if let Some(options) = &env.options {
        config
            .options
            .extend(options.iter().map(|(key, value)| (key.clone(), value.clone())));
    }
    if let Some(storage) = &env.storage {
        config
            .options
            .insert(OPTION_STORAGE.to_owned(), storage.clone());
    }
    if let Some(ssl) = env.ssl {
        config.options.insert(OPTION_SSL.to_owned(), ssl.to_string());
    }
}

fn set_clone<T: Clone>(field: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        field.clone_from(value);
    }
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// An env var was present but not valid UTF-8.
    NotUnicode {
        /// Env var name.
        var: &'static str,
    },
    /// Boolean env var had an invalid value.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// CSV contained an entry that is not `key=value` with a non-empty key.
    InvalidOptionEntry {
        /// Env var name.
        var: &'static str,
        /// Invalid entry.
        entry: String,
    },
    /// CSV list exceeds a safety limit.
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Number of parsed items.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::NotUnicode { .. } => ErrorCode::new("config", "invalid_env_utf8"),
            Self::InvalidBool { .. } => ErrorCode::new("config", "invalid_env_bool"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidOptionEntry { .. } | Self::CsvTooLarge { .. } => {
                ErrorCode::new("config", "invalid_env_csv")
            },
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::NotUnicode { var } => write!(formatter, "{var} must be valid UTF-8"),
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidOptionEntry { var, .. } => {
                write!(formatter, "{var} entries must be key=value pairs")
            },
            Self::CsvTooLarge { var, len, max } => {
                write!(formatter, "{var} is too large ({len} items, max {max})")
            },
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } | EnvParseError::NotUnicode { var } => {
                envelope.with_metadata("env_var", var)
            },
            EnvParseError::InvalidBool { var, value } | EnvParseError::InvalidInt { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", redact_value(var, &value))
            },
            EnvParseError::InvalidOptionEntry { var, entry } => envelope
                .with_metadata("env_var", var)
                .with_metadata("entry", redact_value(&entry, &entry)),
            EnvParseError::CsvTooLarge { var, len, max } => envelope
                .with_metadata("env_var", var)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned()))
}

fn parse_optional_string_allow_empty(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Option<String> {
    map.get(var).map(|raw| raw.trim().to_owned())
}

fn parse_optional_i64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<i64>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError::InvalidBool {
            var,
            value: raw.clone(),
        }),
    }
}

fn parse_optional_csv_options(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<BTreeMap<String, String>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Some(BTreeMap::new()));
    }

    let items = parse_csv(trimmed);
    if items.len() > MAX_CSV_ITEMS {
        return Err(EnvParseError::CsvTooLarge {
            var,
            len: items.len(),
            max: MAX_CSV_ITEMS,
        });
    }

    let mut options = BTreeMap::new();
    for item in items {
        let Some((key, value)) = item.split_once('=') else {
            return Err(EnvParseError::InvalidOptionEntry { var, entry: item });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(EnvParseError::InvalidOptionEntry { var, entry: item });
        }
        // Later entries win for repeated keys.
        options.insert(key.to_owned(), value.trim().to_owned());
    }

    Ok(Some(options))
}

fn parse_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn redact_value(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_owned()
    } else {
        value.to_owned()
    }
}
