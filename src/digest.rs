//! End-of-day summary email built from the completion log.

use crate::collaborators::EmailSender;
use crate::db::CompletionRecord;
use crate::handlers::HandlerError;
use crate::types::TaskStatus;
use crate::util::capitalize;

pub const DIGEST_SUBJECT: &str = "Your Daily Broker Summary";

const NO_DETAILS: &str = "[No details provided]";

fn completed(records: &[CompletionRecord]) -> impl Iterator<Item = &CompletionRecord> {
    records.iter().filter(|r| r.status == TaskStatus::Completed)
}

/// Only completed records are listed; failed and rejected rows are left out.
pub fn build_digest_body(records: &[CompletionRecord]) -> String {
    let mut body = String::from("Here\u{2019}s a summary of today\u{2019}s broker activity:\n\n");
    let lines: Vec<String> = completed(records)
        .map(|r| {
            let content = if r.content.trim().is_empty() {
                NO_DETAILS
            } else {
                r.content.as_str()
            };
            format!("- [{}] {}", capitalize(r.task_type.as_str()), content)
        })
        .collect();
    if lines.is_empty() {
        body.push_str("No tasks completed today.");
    } else {
        body.push_str(&lines.join("\n"));
    }
    body
}

/// Send today's digest to `to`. Returns the number of completed tasks listed.
pub async fn send_daily_digest(
    sender: &(dyn EmailSender + Send + Sync),
    to: &str,
    records: &[CompletionRecord],
) -> Result<usize, HandlerError> {
    sender
        .send(to, DIGEST_SUBJECT, &build_digest_body(records))
        .await?;
    let listed = completed(records).count();
    log::info!("Sent daily digest of {} tasks to {}", listed, to);
    Ok(listed)
}
