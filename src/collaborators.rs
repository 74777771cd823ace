//! Seams between the pipeline and the outside world.
//!
//! `run_agent` receives every collaborator explicitly. The binary wires the
//! SQLite store and the Google adapters in; tests wire in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::db::{Appointment, BrokerDb, DbError, FollowUpClient, MissingDocument};
use crate::handlers::HandlerError;
use crate::llm::TextGenerator;
use crate::types::{TaskStatus, TaskType};

/// Client facts and the completion log.
///
/// Synchronous: the SQLite connection is owned by one thread and every call
/// commits on its own.
pub trait ClientStore {
    fn followup_clients(&self) -> Result<Vec<FollowUpClient>, DbError>;
    fn missing_documents(&self) -> Result<Vec<MissingDocument>, DbError>;
    fn upcoming_appointments(&self) -> Result<Vec<Appointment>, DbError>;
    /// `None` when no client with that exact name has an address on file.
    fn client_email_by_name(&self, name: &str) -> Result<Option<String>, DbError>;
    /// Returns the number of client rows updated.
    fn update_client_notes(&self, email: &str, notes: &str) -> Result<usize, DbError>;
    fn log_task_completion(
        &self,
        task_type: TaskType,
        content: &str,
        notes: &str,
        status: TaskStatus,
    ) -> Result<i64, DbError>;
}

impl ClientStore for BrokerDb {
    fn followup_clients(&self) -> Result<Vec<FollowUpClient>, DbError> {
        self.get_followup_clients()
    }

    fn missing_documents(&self) -> Result<Vec<MissingDocument>, DbError> {
        self.get_missing_documents()
    }

    fn upcoming_appointments(&self) -> Result<Vec<Appointment>, DbError> {
        self.get_upcoming_appointments()
    }

    fn client_email_by_name(&self, name: &str) -> Result<Option<String>, DbError> {
        self.get_client_email_by_name(name)
    }

    fn update_client_notes(&self, email: &str, notes: &str) -> Result<usize, DbError> {
        BrokerDb::update_client_notes(self, email, notes)
    }

    fn log_task_completion(
        &self,
        task_type: TaskType,
        content: &str,
        notes: &str,
        status: TaskStatus,
    ) -> Result<i64, DbError> {
        BrokerDb::log_task_completion(self, task_type, content, notes, status)
    }
}

#[async_trait]
pub trait EmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), HandlerError>;
}

/// A timed event to create. Times are wall-clock in `time_zone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
    pub calendar_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

#[async_trait]
pub trait CalendarScheduler {
    async fn schedule(&self, event: &EventRequest) -> Result<CreatedEvent, HandlerError>;
}

/// Everything a run talks to, borrowed for the duration of the run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub store: &'a dyn ClientStore,
    pub generator: &'a (dyn TextGenerator + Send + Sync),
    pub email: &'a (dyn EmailSender + Send + Sync),
    pub calendar: &'a (dyn CalendarScheduler + Send + Sync),
}
