//! Validate command handler.

use super::ConfigSourceArgs;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_output};
use crate::{CliOutput, format_error_output};
use dataset_config::{DatasetEnv, load_dataset_config_from_path};

/// Load every source, validate once, and report the outcome.
pub fn run_validate(
    mode: OutputMode,
    source: &ConfigSourceArgs,
    env: &DatasetEnv,
) -> Result<CliOutput, CliError> {
    let config =
        match load_dataset_config_from_path(source.path(), source.overrides_json(), env) {
            Ok(config) => config,
            Err(error) => return format_error_output(mode, &error),
        };
    tracing::info!(name = %config.name, "config validate completed");

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "configPath": source.path_display(),
            "name": config.name,
        }))?
    } else {
        source.path_display().map_or_else(
            || "status: ok\nconfig: ok\n".to_owned(),
            |path| format!("status: ok\nconfig: ok\npath: {path}\n"),
        )
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
