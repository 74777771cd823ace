//! CRM note updates: `Update notes for <email>: <note>`.

use super::{HandlerError, HandlerOutcome};
use crate::collaborators::ClientStore;

pub const EXPECTED_FORMAT: &str = "Update notes for <email>: <note>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmUpdate {
    pub email: String,
    pub notes: String,
}

/// Split CRM content at the first colon.
///
/// The email is whatever follows the last "for" in the header. Returns
/// `None` when there is no colon.
pub fn parse_crm_update(content: &str) -> Option<CrmUpdate> {
    let (header, notes) = content.split_once(':')?;
    let header = header.trim();
    let email = match header.rfind("for") {
        Some(idx) => &header[idx + "for".len()..],
        None => header,
    };
    Some(CrmUpdate {
        email: email.trim().to_string(),
        notes: notes.trim().to_string(),
    })
}

pub fn handle_crm(content: &str, store: &dyn ClientStore) -> Result<HandlerOutcome, HandlerError> {
    let Some(update) = parse_crm_update(content) else {
        log::error!(
            "Invalid CRM task format: '{}'. Expected '{}'",
            content,
            EXPECTED_FORMAT
        );
        return Ok(HandlerOutcome::rejected(format!(
            "Invalid CRM task format. Expected '{}'",
            EXPECTED_FORMAT
        )));
    };

    let updated = store.update_client_notes(&update.email, &update.notes)?;
    if updated == 0 {
        log::warn!("CRM update matched no client with email {}", update.email);
        return Ok(HandlerOutcome::completed(format!(
            "No client found with email {}; notes not stored.",
            update.email
        )));
    }

    log::info!("Updated CRM notes for {}", update.email);
    Ok(HandlerOutcome::completed(format!(
        "Updated CRM notes for {}.",
        update.email
    )))
}
