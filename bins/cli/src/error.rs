//! CLI error and exit code types.

use dataset_shared::{ErrorEnvelope, ErrorKind};
use thiserror::Error;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    InvalidInput = 2,
    Io = 3,
    Internal = 1,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exit code for a failed config load.
    #[must_use]
    pub fn for_envelope(error: &ErrorEnvelope) -> Self {
        match error.kind {
            ErrorKind::Expected if error.code.code().starts_with("config_file_") => Self::Io,
            ErrorKind::Expected => Self::InvalidInput,
            ErrorKind::Invariant | ErrorKind::Unexpected => Self::Internal,
        }
    }
}

/// Failures that abort the CLI before any structured output is written.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("logging setup failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) | Self::Logging(_) => ExitCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset_shared::{ErrorClass, ErrorCode};

    #[test]
    fn config_rejections_are_invalid_input() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_config(), "name cannot be empty");
        assert_eq!(ExitCode::for_envelope(&error), ExitCode::InvalidInput);
        assert_eq!(ExitCode::InvalidInput.as_u8(), 2);
    }

    #[test]
    fn unreadable_config_files_are_io() {
        let error = ErrorEnvelope::expected(
            ErrorCode::new("config", "config_file_not_found"),
            "failed to read config file",
        );
        assert_eq!(ExitCode::for_envelope(&error), ExitCode::Io);
        assert_eq!(ExitCode::Io.as_u8(), 3);
    }

    #[test]
    fn unexpected_errors_are_internal() {
        let error = ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            "failed to serialize config",
            ErrorClass::NonRetriable,
        );
        assert_eq!(ExitCode::for_envelope(&error), ExitCode::Internal);
    }

    #[test]
    fn io_cli_errors_exit_with_io_code() {
        let error = CliError::from(std::io::Error::other("broken pipe"));
        assert_eq!(error.exit_code(), ExitCode::Io);
        assert_eq!(error.to_string(), "io error: broken pipe");
    }
}
