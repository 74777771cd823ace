//! Google-backed collaborators: Gmail for email, Calendar for events.
//!
//! Both read the OAuth token from disk on every call and refresh it when it
//! is about to expire.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::collaborators::{CalendarScheduler, CreatedEvent, EmailSender, EventRequest};
use crate::google_api::{self, calendar, gmail};
use crate::handlers::HandlerError;

pub struct GmailSender {
    token_path: PathBuf,
}

impl GmailSender {
    pub fn new(token_path: PathBuf) -> Self {
        Self { token_path }
    }
}

#[async_trait]
impl EmailSender for GmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), HandlerError> {
        let access_token = google_api::get_valid_access_token(&self.token_path).await?;
        let id = gmail::send_message(&access_token, to, subject, body).await?;
        log::debug!("Gmail message {} sent to {}", id, to);
        Ok(())
    }
}

pub struct GoogleCalendar {
    token_path: PathBuf,
}

impl GoogleCalendar {
    pub fn new(token_path: PathBuf) -> Self {
        Self { token_path }
    }
}

#[async_trait]
impl CalendarScheduler for GoogleCalendar {
    async fn schedule(&self, event: &EventRequest) -> Result<CreatedEvent, HandlerError> {
        let access_token = google_api::get_valid_access_token(&self.token_path).await?;
        let inserted = calendar::insert_event(
            &access_token,
            &event.calendar_id,
            &event.title,
            event.start,
            event.end,
            &event.time_zone,
        )
        .await?;
        Ok(CreatedEvent {
            id: inserted.id,
            html_link: inserted.html_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google_api::GoogleApiError;

    #[tokio::test]
    async fn test_missing_token_surfaces_as_google_error() {
        let dir = tempfile::tempdir().unwrap();
        let sender = GmailSender::new(dir.path().join("token.json"));

        let result = sender.send("a@example.com", "Hi", "Body").await;
        assert!(matches!(
            result,
            Err(HandlerError::Google(GoogleApiError::TokenNotFound(_)))
        ));
    }
}
