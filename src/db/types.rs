use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Database schema error: {0}")]
    Schema(String),

    #[error("Stored task has an unknown type: {0}")]
    UnknownTaskType(#[from] crate::types::UnknownTaskType),

    #[error("Stored task has an unknown status: {0}")]
    UnknownTaskStatus(#[from] crate::types::UnknownTaskStatus),
}

/// A client still in progress (not Closed/Completed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpClient {
    pub name: String,
    pub email: Option<String>,
    pub status: String,
    pub last_contacted: Option<String>,
}

/// A requested document the client has not sent yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingDocument {
    pub name: String,
    pub doc_type: String,
}

/// An appointment within the next three days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub datetime: String,
}

/// A row from the `completed_tasks` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub task_type: crate::types::TaskType,
    pub content: String,
    pub notes: String,
    pub status: crate::types::TaskStatus,
    pub completed_at: String,
}
