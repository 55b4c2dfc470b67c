//! CLI binary entrypoint.

mod commands;
mod error;
mod format;
mod logging;

use clap::{Parser, Subcommand};
use commands::{ConfigSourceArgs, run_show, run_url, run_validate};
use dataset_config::DatasetEnv;
use dataset_shared::{ErrorEnvelope, is_secret_key};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, to_json_output};
use logging::init_logging;
use std::io::{self, Write};

#[derive(Debug, Parser)]
#[command(
    name = "dsc",
    version,
    about = "Validate dataset configs and derive connection URLs",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load and validate the effective config.
    Validate {
        #[command(flatten)]
        source: ConfigSourceArgs,
    },
    /// Print the effective normalized config.
    Show {
        #[command(flatten)]
        source: ConfigSourceArgs,
    },
    /// Print the connection URL for the effective config.
    Url {
        #[command(flatten)]
        source: ConfigSourceArgs,
        /// Build the URL from the merged record without validating it.
        #[arg(long)]
        skip_validation: bool,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    if let Err(error) = init_logging(&cli.output) {
        return exit_with_error(&error);
    }

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    let env = match DatasetEnv::from_std_env() {
        Ok(env) => env,
        Err(error) => return format_error_output(mode, &error.into()),
    };

    match command {
        Commands::Validate { source } => run_validate(mode, source, &env),
        Commands::Show { source } => run_show(mode, source, &env),
        Commands::Url {
            source,
            skip_validation,
        } => run_url(mode, source, *skip_validation, &env),
    }
}

/// Render a failed load as command output; the exit code follows the error kind.
pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &ErrorEnvelope,
) -> Result<CliOutput, CliError> {
    let error = sanitize_error(error.clone());
    let exit_code = ExitCode::for_envelope(&error);

    let stdout = if mode.is_json() {
        to_json_output(&serde_json::json!({
            "status": "error",
            "error": error,
        }))?
    } else {
        format_error_text(&error)
    };

    Ok(CliOutput { stdout, exit_code })
}

fn sanitize_error(error: ErrorEnvelope) -> ErrorEnvelope {
    let secret_keys: Vec<String> = error
        .metadata
        .keys()
        .filter(|key| is_secret_key(key))
        .cloned()
        .collect();
    let secret_keys: Vec<&str> = secret_keys.iter().map(String::as_str).collect();
    error.redact_metadata(&secret_keys)
}

fn format_error_text(error: &ErrorEnvelope) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
