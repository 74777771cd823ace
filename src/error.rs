//! Error types for an agent run
//!
//! Errors are classified by recoverability:
//! - Retryable: network issues, timeouts, rate limits
//! - NonRetryable: configuration errors, database failures
//! - RequiresUserAction: missing Claude CLI, expired Google auth

use std::path::PathBuf;
use thiserror::Error;

use crate::db::DbError;
use crate::google_api::GoogleApiError;
use crate::handlers::HandlerError;
use crate::llm::GenerationError;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Error types for a full plan-and-dispatch run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Plan generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Task '{content}' failed: {source}")]
    Task {
        content: String,
        source: HandlerError,
    },

    #[error("Google API error: {0}")]
    Google(#[from] GoogleApiError),
}

impl RunError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RunError::Generation(e) => e.is_retryable(),
            RunError::Task { source, .. } => source.is_retryable(),
            RunError::Google(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            RunError::Generation(GenerationError::ClaudeCodeNotFound)
                | RunError::Generation(GenerationError::ClaudeCodeNotAuthenticated)
                | RunError::Generation(GenerationError::MissingApiKey(_))
                | RunError::Google(GoogleApiError::AuthExpired)
                | RunError::Google(GoogleApiError::TokenNotFound(_))
                | RunError::Config(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RunError::Config(_) => "Check your configuration in ~/.brokerday/config.json",
            RunError::Database(_) => "Check the database path and file permissions.",
            RunError::Generation(GenerationError::ClaudeCodeNotFound) => {
                "Install Claude Code from https://claude.ai/code"
            }
            RunError::Generation(GenerationError::ClaudeCodeNotAuthenticated) => {
                "Run 'claude login' in your terminal to authenticate."
            }
            RunError::Generation(GenerationError::MissingApiKey(_)) => {
                "Export the API key variable named in generator.apiKeyEnv."
            }
            RunError::Generation(_) => "Check the generator backend and try again.",
            RunError::Google(GoogleApiError::AuthExpired)
            | RunError::Google(GoogleApiError::TokenNotFound(_)) => {
                "Re-authorize Google access and save the token to google.tokenPath."
            }
            RunError::Google(_) => "Check your internet connection and try again.",
            RunError::Task { .. } => {
                "Check the task history; completed tasks were recorded before the failure."
            }
        }
    }
}
