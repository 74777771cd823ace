//! Task handlers: one side effect per task.
//!
//! Each handler consumes a task's content and talks to exactly one
//! collaborator. Malformed content is reported as a `Rejected` outcome, never
//! as an error; errors are reserved for collaborator failures.

pub mod calendar;
pub mod crm;
pub mod email;

use thiserror::Error;

use crate::db::DbError;
use crate::google_api::GoogleApiError;
use crate::types::TaskStatus;

pub use calendar::{handle_calendar, parse_event_request};
pub use crm::{handle_crm, parse_crm_update, CrmUpdate};
pub use email::{extract_client_name, handle_email, reminder_body};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Google API error: {0}")]
    Google(#[from] GoogleApiError),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

impl HandlerError {
    pub fn is_retryable(&self) -> bool {
        match self {
            HandlerError::Google(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// What a handler did, recorded in the completion log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome {
    pub status: TaskStatus,
    pub summary: String,
}

impl HandlerOutcome {
    pub fn completed(summary: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Completed,
            summary: summary.into(),
        }
    }

    pub fn rejected(summary: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Rejected,
            summary: summary.into(),
        }
    }
}
