//! Text generation backends for the daily plan.
//!
//! A backend takes the rendered prompt and returns the model's raw text.
//! Nothing here validates or parses the response.

pub mod claude_cli;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{GeneratorBackend, GeneratorConfig};

pub use claude_cli::ClaudeCliGenerator;
pub use openai::OpenAiGenerator;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Claude Code CLI not found")]
    ClaudeCodeNotFound,

    #[error("Claude Code is not authenticated")]
    ClaudeCodeNotAuthenticated,

    #[error("Generation backend rate limit reached")]
    RateLimited,

    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    #[error("API key variable {0} is not set")]
    MissingApiKey(String),

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Backend returned no text")]
    EmptyResponse,

    #[error("IO error: {0}")]
    Io(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Timeout(_) | GenerationError::RateLimited => true,
            GenerationError::Http(e) => e.is_timeout() || e.is_connect(),
            GenerationError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[async_trait]
pub trait TextGenerator {
    /// Submit `prompt` and return the response text verbatim.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Construct the backend named in the config.
pub fn build_generator(
    config: &GeneratorConfig,
) -> Result<Box<dyn TextGenerator + Send + Sync>, GenerationError> {
    match config.backend {
        GeneratorBackend::ClaudeCli => Ok(Box::new(
            ClaudeCliGenerator::new()
                .with_timeout(config.timeout_secs)
                .with_model(config.model.clone()),
        )),
        GeneratorBackend::OpenAiCompatible => Ok(Box::new(OpenAiGenerator::from_config(config)?)),
    }
}
