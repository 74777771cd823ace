//! Route each planned task to its handler and record the outcome.
//!
//! Every attempted task gets exactly one row in the completion log, whether
//! it completed, failed, or was rejected as malformed. A failed write to the
//! completion log ends the run.

use crate::collaborators::Collaborators;
use crate::config::{Config, DispatchPolicy};
use crate::error::RunError;
use crate::handlers::{self, HandlerError, HandlerOutcome};
use crate::types::{Task, TaskStatus, TaskType};

/// One attempted task and what came of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: Task,
    pub outcome: HandlerOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub entries: Vec<TaskReport>,
}

impl DispatchReport {
    pub fn count(&self, status: TaskStatus) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.status == status)
            .count()
    }

    /// Entries of one type (all of them for `None`), numbered from 1 within that view.
    pub fn numbered(
        &self,
        filter: Option<TaskType>,
    ) -> impl Iterator<Item = (usize, &TaskReport)> + '_ {
        self.entries
            .iter()
            .filter(move |e| filter.map_or(true, |t| t == e.task.task_type))
            .enumerate()
            .map(|(i, e)| (i + 1, e))
    }
}

pub struct Dispatcher<'a> {
    collaborators: Collaborators<'a>,
    config: &'a Config,
    policy: DispatchPolicy,
}

impl<'a> Dispatcher<'a> {
    pub fn new(collaborators: Collaborators<'a>, config: &'a Config) -> Self {
        Self {
            collaborators,
            config,
            policy: config.dispatch.policy,
        }
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn run_handler(&self, task: &Task) -> Result<HandlerOutcome, HandlerError> {
        let c = &self.collaborators;
        match task.task_type {
            TaskType::Email => {
                handlers::handle_email(&task.content, c.store, c.email, &self.config.email).await
            }
            TaskType::Calendar => {
                let now = handlers::calendar::now_in_zone(&self.config.calendar.time_zone);
                handlers::handle_calendar(&task.content, c.calendar, &self.config.calendar, now)
                    .await
            }
            TaskType::Crm => handlers::handle_crm(&task.content, c.store),
        }
    }

    fn record(&self, task: &Task, outcome: &HandlerOutcome) -> Result<(), RunError> {
        self.collaborators.store.log_task_completion(
            task.task_type,
            &task.content,
            &outcome.summary,
            outcome.status,
        )?;
        Ok(())
    }

    /// Dispatch tasks in order.
    ///
    /// Under `FailFast` the first handler error is recorded and returned;
    /// later tasks are not attempted.
    pub async fn dispatch(&self, tasks: &[Task]) -> Result<DispatchReport, RunError> {
        let mut report = DispatchReport::default();

        for task in tasks {
            log::info!("Executing task: {}", task.task_type);

            let outcome = match self.run_handler(task).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Task '{}' failed: {}", task.content, e);
                    let failed = HandlerOutcome {
                        status: TaskStatus::Failed,
                        summary: e.to_string(),
                    };
                    self.record(task, &failed)?;
                    if self.policy == DispatchPolicy::FailFast {
                        return Err(RunError::Task {
                            content: task.content.clone(),
                            source: e,
                        });
                    }
                    failed
                }
            };

            if outcome.status != TaskStatus::Failed {
                self.record(task, &outcome)?;
            }
            report.entries.push(TaskReport {
                task: task.clone(),
                outcome,
            });
        }

        log::info!(
            "Dispatched {} tasks: {} completed, {} failed, {} rejected",
            report.entries.len(),
            report.count(TaskStatus::Completed),
            report.count(TaskStatus::Failed),
            report.count(TaskStatus::Rejected)
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{CalendarScheduler, CreatedEvent, EmailSender, EventRequest};
    use crate::db::test_utils::{insert_client, test_db};
    use crate::llm::{GenerationError, TextGenerator};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoGenerator;

    #[async_trait]
    impl TextGenerator for NoGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }
    }

    #[derive(Default)]
    struct CountingEmail {
        fail: bool,
        sent: AtomicUsize,
    }

    #[async_trait]
    impl EmailSender for CountingEmail {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), HandlerError> {
            if self.fail {
                return Err(HandlerError::Delivery("mailbox unavailable".to_string()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingCalendar {
        scheduled: AtomicUsize,
    }

    #[async_trait]
    impl CalendarScheduler for CountingCalendar {
        async fn schedule(&self, _event: &EventRequest) -> Result<CreatedEvent, HandlerError> {
            self.scheduled.fetch_add(1, Ordering::SeqCst);
            Ok(CreatedEvent {
                id: "evt".to_string(),
                html_link: None,
            })
        }
    }

    fn plan() -> Vec<Task> {
        vec![
            Task::new(TaskType::Email, "Email Jane to request documents"),
            Task::new(TaskType::Calendar, "Call John about refinance"),
            Task::new(TaskType::Crm, "bad format"),
        ]
    }

    #[tokio::test]
    async fn test_best_effort_records_every_task() {
        let db = test_db();
        let email = CountingEmail {
            fail: true,
            ..Default::default()
        };
        let calendar = CountingCalendar::default();
        let config = Config::default();
        let collaborators = Collaborators {
            store: &db,
            generator: &NoGenerator,
            email: &email,
            calendar: &calendar,
        };

        let report = Dispatcher::new(collaborators, &config)
            .dispatch(&plan())
            .await
            .unwrap();

        assert_eq!(report.count(TaskStatus::Failed), 1);
        assert_eq!(report.count(TaskStatus::Completed), 1);
        assert_eq!(report.count(TaskStatus::Rejected), 1);
        assert_eq!(calendar.scheduled.load(Ordering::SeqCst), 1);

        let log = db.get_task_log().unwrap();
        assert_eq!(log.len(), 3);
        let failed = log.iter().find(|r| r.task_type == TaskType::Email).unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert!(failed.notes.contains("mailbox unavailable"));
    }

    #[tokio::test]
    async fn test_fail_fast_stops_after_first_failure() {
        let db = test_db();
        let email = CountingEmail {
            fail: true,
            ..Default::default()
        };
        let calendar = CountingCalendar::default();
        let config = Config::default();
        let collaborators = Collaborators {
            store: &db,
            generator: &NoGenerator,
            email: &email,
            calendar: &calendar,
        };

        let result = Dispatcher::new(collaborators, &config)
            .with_policy(DispatchPolicy::FailFast)
            .dispatch(&plan())
            .await;

        assert!(matches!(result, Err(RunError::Task { .. })));
        assert_eq!(calendar.scheduled.load(Ordering::SeqCst), 0);
        let log = db.get_task_log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_successful_tasks_logged_with_summaries() {
        let db = test_db();
        insert_client(&db, "Client", Some("client@example.com"), "New", None);
        let email = CountingEmail::default();
        let calendar = CountingCalendar::default();
        let config = Config::default();
        let collaborators = Collaborators {
            store: &db,
            generator: &NoGenerator,
            email: &email,
            calendar: &calendar,
        };

        let tasks = vec![
            Task::new(TaskType::Email, "Email Jane"),
            Task::new(TaskType::Crm, "Update notes for client@example.com: Needs follow-up"),
        ];
        let report = Dispatcher::new(collaborators, &config)
            .dispatch(&tasks)
            .await
            .unwrap();

        assert_eq!(report.count(TaskStatus::Completed), 2);
        assert_eq!(email.sent.load(Ordering::SeqCst), 1);
        let log = db.get_task_log().unwrap();
        assert!(log
            .iter()
            .any(|r| r.notes == "Sent follow-up email to Client for missing documents."));
    }

    #[tokio::test]
    async fn test_empty_plan_dispatches_nothing() {
        let db = test_db();
        let email = CountingEmail::default();
        let calendar = CountingCalendar::default();
        let config = Config::default();
        let collaborators = Collaborators {
            store: &db,
            generator: &NoGenerator,
            email: &email,
            calendar: &calendar,
        };

        let report = Dispatcher::new(collaborators, &config)
            .dispatch(&[])
            .await
            .unwrap();
        assert!(report.entries.is_empty());
        assert!(db.get_task_log().unwrap().is_empty());
    }

    #[test]
    fn test_numbering_follows_the_filtered_view() {
        let report = DispatchReport {
            entries: plan()
                .into_iter()
                .chain([Task::new(TaskType::Email, "Email Maria")])
                .map(|task| TaskReport {
                    task,
                    outcome: HandlerOutcome::completed("done"),
                })
                .collect(),
        };

        let emails: Vec<(usize, &str)> = report
            .numbered(Some(TaskType::Email))
            .map(|(n, e)| (n, e.task.content.as_str()))
            .collect();
        assert_eq!(
            emails,
            vec![(1, "Email Jane to request documents"), (2, "Email Maria")]
        );

        let all: Vec<usize> = report.numbered(None).map(|(n, _)| n).collect();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }
}
