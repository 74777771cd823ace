//! Follow-up email for missing pre-approval documents.

use std::sync::OnceLock;

use regex::Regex;

use super::{HandlerError, HandlerOutcome};
use crate::collaborators::{ClientStore, EmailSender};
use crate::config::EmailConfig;

/// Used when the content names no client.
pub const DEFAULT_CLIENT_NAME: &str = "Client";

fn name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"with ([A-Za-z ]+?) to request").ok())
        .as_ref()
}

/// The client name between "with" and "to request", if present.
pub fn extract_client_name(content: &str) -> Option<String> {
    name_pattern()?
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn reminder_body(name: &str) -> String {
    format!(
        "\nHi {name},\n\n\
         This is a reminder to send the following documents needed for your pre-approval:\n\n\
         - ID proof\n\
         - Bank statement\n\
         - Payslip\n\n\
         Please reply to this email or upload them via the Broker Portal.\n\n\
         Regards,  \n\
         Broker AI Assistant\n"
    )
}

pub async fn handle_email(
    content: &str,
    store: &dyn ClientStore,
    sender: &(dyn EmailSender + Send + Sync),
    config: &EmailConfig,
) -> Result<HandlerOutcome, HandlerError> {
    let name = extract_client_name(content).unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());
    let to = match store.client_email_by_name(&name)? {
        Some(address) => address,
        None => {
            log::warn!(
                "No email on file for '{}', using {}",
                name,
                config.fallback_address
            );
            config.fallback_address.clone()
        }
    };

    sender.send(&to, &config.subject, &reminder_body(&name)).await?;
    log::info!("Sent follow-up email to {} <{}>", name, to);

    Ok(HandlerOutcome::completed(format!(
        "Sent follow-up email to {} for missing documents.",
        name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{insert_client, test_db};
    use crate::types::TaskStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), HandlerError> {
            if self.fail {
                return Err(HandlerError::Delivery("smtp down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_extract_client_name() {
        assert_eq!(
            extract_client_name("Follow up with Maria Lopez to request documents").as_deref(),
            Some("Maria Lopez")
        );
        assert_eq!(extract_client_name("Email Jane about documents"), None);
    }

    #[test]
    fn test_extract_client_name_is_lazy() {
        assert_eq!(
            extract_client_name("Check with Ana to request docs to request more").as_deref(),
            Some("Ana")
        );
    }

    #[test]
    fn test_reminder_body() {
        let body = reminder_body("Maria Lopez");
        assert!(body.starts_with("\nHi Maria Lopez,\n\n"));
        assert!(body.contains("- ID proof\n- Bank statement\n- Payslip\n"));
        assert!(body.ends_with("Regards,  \nBroker AI Assistant\n"));
    }

    #[tokio::test]
    async fn test_sends_to_known_client() {
        let db = test_db();
        insert_client(&db, "Maria Lopez", Some("maria@example.com"), "New", None);
        let sender = RecordingSender::default();

        let outcome = handle_email(
            "Follow up with Maria Lopez to request documents",
            &db,
            &sender,
            &EmailConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.status, TaskStatus::Completed);
        assert_eq!(
            outcome.summary,
            "Sent follow-up email to Maria Lopez for missing documents."
        );
        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent[0].0, "maria@example.com");
        assert_eq!(sent[0].1, "Follow-up Required for Pre-Approval");
    }

    #[tokio::test]
    async fn test_unknown_client_uses_fallback_address() {
        let db = test_db();
        let sender = RecordingSender::default();

        let outcome = handle_email("Email Jane", &db, &sender, &EmailConfig::default())
            .await
            .unwrap();

        assert!(outcome.summary.contains("to Client for"));
        assert_eq!(sender.sent.lock().unwrap()[0].0, "client@example.com");
    }

    #[tokio::test]
    async fn test_send_failure_propagates() {
        let db = test_db();
        let sender = RecordingSender {
            fail: true,
            ..Default::default()
        };

        let result = handle_email("Email Jane", &db, &sender, &EmailConfig::default()).await;
        assert!(matches!(result, Err(HandlerError::Delivery(_))));
    }
}
