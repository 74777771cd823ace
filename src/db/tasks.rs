use rusqlite::params;

use super::*;
use crate::types::{TaskStatus, TaskType};

impl BrokerDb {
    // =========================================================================
    // Task completion log
    // =========================================================================

    /// Append one row to the completion log. `completed_at` is set by SQLite.
    pub fn log_task_completion(
        &self,
        task_type: TaskType,
        content: &str,
        notes: &str,
        status: TaskStatus,
    ) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT INTO completed_tasks (type, content, notes, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![task_type.as_str(), content, notes, status.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The full completion log, newest first.
    pub fn get_task_log(&self) -> Result<Vec<CompletionRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, content, notes, status, completed_at
             FROM completed_tasks
             ORDER BY completed_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, task_type, content, notes, status, completed_at) = row?;
            records.push(CompletionRecord {
                id,
                task_type: task_type.parse()?,
                content,
                notes,
                status: status.parse()?,
                completed_at,
            });
        }
        Ok(records)
    }

    /// Completion rows recorded today. SQLite stamps `completed_at` in UTC.
    pub fn get_task_log_for_today(&self) -> Result<Vec<CompletionRecord>, DbError> {
        Ok(self
            .get_task_log()?
            .into_iter()
            .filter(|r| is_today(&r.completed_at))
            .collect())
    }
}

fn is_today(completed_at: &str) -> bool {
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    completed_at.starts_with(&today)
}
