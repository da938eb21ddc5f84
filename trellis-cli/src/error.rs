//! CLI-specific error types and exit code mapping

use trellis_collector::CollectorError;
use trellis_core::error::{ConfigError, TrellisError};

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Inventory collection or reporting failed.
    #[error("collect error: {0}")]
    Collect(#[from] CollectorError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from trellis-core.
    #[error("{0}")]
    Core(#[from] TrellisError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                     |
    /// |------|-----------------------------|
    /// | 0    | Success                     |
    /// | 1    | General / command error     |
    /// | 2    | Configuration error         |
    /// | 3    | Collection failed           |
    /// | 10   | IO error                    |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Core(TrellisError::Config(_)) => 2,
            Self::Collect(CollectorError::ConfigurationConflict { .. })
            | Self::Collect(CollectorError::Config { .. }) => 2,
            Self::Collect(_) => 3,
            Self::Io(_) | Self::Core(TrellisError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
