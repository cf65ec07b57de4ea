//! Fatal CLI errors
//!
//! Every error here ends the command with a JSON `{"error": ...}` object on
//! stdout and exit code 1.

use thiserror::Error;

/// Errors that abort the command
#[derive(Debug, Error)]
pub enum CliError {
    /// No firmware file given
    #[error("Usage: espscope <firmware.bin>")]
    Usage,

    /// Arguments could not be parsed
    #[error("{0}")]
    Args(#[source] clap::Error),

    /// Report could not be serialized
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
