use serde::{Deserialize, Serialize};

/// Which handler a task is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Email,
    Calendar,
    Crm,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Email, TaskType::Calendar, TaskType::Crm];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Email => "email",
            TaskType::Calendar => "calendar",
            TaskType::Crm => "crm",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task type string that names none of the three handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task type: {0}")]
pub struct UnknownTaskType(pub String);

impl std::str::FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(TaskType::Email),
            "calendar" => Ok(TaskType::Calendar),
            "crm" => Ok(TaskType::Crm),
            _ => Err(UnknownTaskType(s.to_string())),
        }
    }
}

/// One line of the day's plan, classified and stripped of list markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub content: String,
}

impl Task {
    pub fn new(task_type: TaskType, content: impl Into<String>) -> Self {
        Self {
            task_type,
            content: content.into(),
        }
    }

    /// Build a task from loosely typed parts (stored rows, CLI input).
    pub fn from_parts(task_type: &str, content: &str) -> Result<Self, UnknownTaskType> {
        Ok(Self::new(task_type.parse()?, content))
    }
}

/// Outcome stored in the `completed_tasks.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The handler produced its side effect.
    Completed,
    /// The handler (or its collaborator) returned an error.
    Failed,
    /// The task content was malformed; nothing was attempted.
    Rejected,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct UnknownTaskStatus(pub String);

impl std::str::FromStr for TaskStatus {
    type Err = UnknownTaskStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            "rejected" => Ok(TaskStatus::Rejected),
            _ => Err(UnknownTaskStatus(s.to_string())),
        }
    }
}
