//! Error types for the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors related to configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid gate scope '{0}' (expected \"chat\" or \"global\")")]
    InvalidScope(String),
}

/// Reasons a `/blockca` argument string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("expected exactly two arguments, got {0}")]
    WrongArity(usize),

    #[error("amount '{0}' is not a positive integer")]
    InvalidAmount(String),

    #[error("unknown unit '{0}'")]
    InvalidUnit(String),

    #[error("duration {amount} {unit} is too large")]
    OutOfRange { amount: u32, unit: String },
}

/// Failure of a call into the chat platform.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the moderation handlers.
#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("Sender is not an administrator")]
    PrivilegeDenied,

    #[error("Invalid duration: {0}")]
    InvalidDuration(#[from] DurationError),

    #[error("Failed to look up member role: {0}")]
    RoleLookup(#[source] PlatformError),

    #[error("Platform call failed: {0}")]
    Platform(#[from] PlatformError),
}

impl ModerationError {
    /// Whether the error was caused by the user's input rather than a
    /// failing collaborator. These are answered in chat and not logged as
    /// failures.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ModerationError::PrivilegeDenied | ModerationError::InvalidDuration(_)
        )
    }
}
