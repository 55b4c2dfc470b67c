//! Url command handler.

use super::ConfigSourceArgs;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_output};
use crate::{CliOutput, format_error_output};
use dataset_config::{
    ConnectionScheme, DatasetEnv, ValidatedDatasetConfig, build_connection_url,
    load_dataset_config_from_path, load_unvalidated_dataset_config,
};

/// Print the connection URL for the effective config.
///
/// With `skip_validation` the URL is built from the raw merged record.
pub fn run_url(
    mode: OutputMode,
    source: &ConfigSourceArgs,
    skip_validation: bool,
    env: &DatasetEnv,
) -> Result<CliOutput, CliError> {
    let loaded = if skip_validation {
        load_unvalidated_dataset_config(source.path(), source.overrides_json(), env)
    } else {
        load_dataset_config_from_path(source.path(), source.overrides_json(), env)
            .map(ValidatedDatasetConfig::into_inner)
    };
    let config = match loaded {
        Ok(config) => config,
        Err(error) => return format_error_output(mode, &error),
    };

    let scheme = ConnectionScheme::for_config(&config);
    let url = build_connection_url(&config);
    tracing::debug!(%url, skip_validation, "built connection url");

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "ok",
            "url": url,
            "scheme": scheme.as_str(),
            "validated": !skip_validation,
        }))?
    } else {
        format!("status: ok\nurl: {url}\n")
    };

    Ok(CliOutput {
        stdout,
        exit_code: ExitCode::Ok,
    })
}
