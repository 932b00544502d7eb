use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow schedulers and wrappers to distinguish between
/// a clean replay, a replay where some items were skipped, and hard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - every step completed without skipped items
    Success = 0,
    /// The run completed but at least one item was skipped or failed
    CompletedWithSkips = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration, scenario, I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::CompletedWithSkips => write!(f, "Completed With Skips (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised by the dispatch and acquisition pipeline.
///
/// Item-local variants (`TransientFetch`, `IntegrityMismatch`,
/// `InvalidReference`, `ReconciliationSkip`) are absorbed at the granularity of
/// one file or one reported application and only surface through status
/// fields and batch reports. `DispatchFailure` aborts an operation fan-out.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Failed to fetch {uri}\nDetails: {details}")]
    TransientFetch { uri: String, details: String },

    #[error("Integrity check failed for {file_name}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        file_name: String,
        expected: String,
        actual: String,
    },

    #[error("Unusable URI '{uri}': {reason}")]
    InvalidReference { uri: String, reason: String },

    #[error("Skipped inventory entry '{name}': {reason}")]
    ReconciliationSkip { name: String, reason: String },

    #[error("Operation could not be created: {details}")]
    DispatchFailure { details: String },

    #[error("Invalid configuration: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    ConfigError {
        path: PathBuf,
        reason: String,
        hint: String,
    },

    #[error("Storage error in {collection}: {details}")]
    Storage {
        collection: &'static str,
        details: String,
    },

    /// Validation error for domain value objects
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl PatchError {
    /// True for errors that describe corrupted or tampered content rather
    /// than a network or vendor problem.
    pub fn is_integrity(&self) -> bool {
        matches!(self, PatchError::IntegrityMismatch { .. })
    }
}
