//! Show command handler.

use super::ConfigSourceArgs;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_output};
use crate::{CliOutput, format_error_output};
use dataset_config::{DatasetConfig, DatasetEnv, load_dataset_config_from_path, to_pretty_toml};

/// Print the effective normalized config.
///
/// Text output is TOML with secret-looking option values redacted.
pub fn run_show(
    mode: OutputMode,
    source: &ConfigSourceArgs,
    env: &DatasetEnv,
) -> Result<CliOutput, CliError> {
    let config =
        match load_dataset_config_from_path(source.path(), source.overrides_json(), env) {
            Ok(config) => config,
            Err(error) => return format_error_output(mode, &error),
        };

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "configPath": source.path_display(),
            "effectiveConfig": serde_json::to_value(config.config())?,
        }))?
    } else {
        let redacted = DatasetConfig {
            options: config.redacted_options(),
            ..config.into_inner()
        };
        let rendered = match to_pretty_toml(&redacted) {
            Ok(rendered) => rendered,
            Err(error) => return format_error_output(mode, &error),
        };
        format!("status: ok\nconfig:\n{rendered}")
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
