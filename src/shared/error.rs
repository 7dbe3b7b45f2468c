use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems and editor integrations to distinguish
/// between different kinds of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - the trace replayed cleanly and output was produced
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (trace I/O error, parse error, engine fault, etc.)
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
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for the dependency-tree engine.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
#[derive(Debug, Error)]
pub enum DepTreeError {
    #[error("Trace file not found: {path}\n\n💡 Hint: {suggestion}")]
    TraceNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to parse trace file: {path}\nDetails: {details}\n\n💡 Hint: The trace must be a JSON array of rule-update batches")]
    TraceParse { path: PathBuf, details: String },

    #[error("Invalid target framework '{value}': {reason}")]
    InvalidTargetFramework { value: String, reason: String },

    #[error("Invalid item spec '{value}': {reason}")]
    InvalidItemSpec { value: String, reason: String },

    #[error("The dependency-tree engine has shut down and no longer accepts events")]
    EngineShutDown,

    #[error("Failed to write output to {path}\nDetails: {details}")]
    OutputWrite { path: PathBuf, details: String },
}
