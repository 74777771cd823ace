//! Prompt rendering for the daily plan.

use crate::db::{Appointment, FollowUpClient, MissingDocument};

/// Rendered in place of an empty section.
const EMPTY_SECTION: &str = "None";

/// Rendered when a client has never been contacted.
const NEVER_CONTACTED: &str = "never";

fn join_or_none(lines: Vec<String>) -> String {
    if lines.is_empty() {
        EMPTY_SECTION.to_string()
    } else {
        lines.join("\n")
    }
}

pub fn format_followups(clients: &[FollowUpClient]) -> String {
    join_or_none(
        clients
            .iter()
            .map(|c| {
                format!(
                    "{} ({}) - Last contacted: {}",
                    c.name,
                    c.status,
                    c.last_contacted.as_deref().unwrap_or(NEVER_CONTACTED)
                )
            })
            .collect(),
    )
}

pub fn format_missing_documents(docs: &[MissingDocument]) -> String {
    join_or_none(
        docs.iter()
            .map(|d| format!("{} is missing {}", d.name, d.doc_type))
            .collect(),
    )
}

pub fn format_appointments(appointments: &[Appointment]) -> String {
    join_or_none(
        appointments
            .iter()
            .map(|a| format!("{} \u{2013} {} at {}", a.name, a.title, a.datetime))
            .collect(),
    )
}

/// Build the planning prompt from the three fact collections.
pub fn format_prompt(
    followups: &[FollowUpClient],
    missing_docs: &[MissingDocument],
    appointments: &[Appointment],
) -> String {
    format!(
        "\nYou are a digital assistant for a mortgage broker.\n\n\
         Your job is to recommend today's top 3 tasks based on:\n\n\
         === Clients Needing Follow-Up ===\n{}\n\n\
         === Missing Documents ===\n{}\n\n\
         === Upcoming Appointments ===\n{}\n\n\
         Respond with exactly 3 tasks as actionable items.\n",
        format_followups(followups),
        format_missing_documents(missing_docs),
        format_appointments(appointments),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_render_none_sections() {
        let prompt = format_prompt(&[], &[], &[]);
        assert!(prompt.contains("=== Clients Needing Follow-Up ===\nNone\n"));
        assert!(prompt.contains("=== Missing Documents ===\nNone\n"));
        assert!(prompt.contains("=== Upcoming Appointments ===\nNone\n"));
        assert!(prompt.starts_with("\nYou are a digital assistant for a mortgage broker."));
        assert!(prompt.ends_with("Respond with exactly 3 tasks as actionable items.\n"));
    }

    #[test]
    fn test_line_templates() {
        let followups = vec![
            FollowUpClient {
                name: "John Smith".to_string(),
                email: None,
                status: "Pre-Approval".to_string(),
                last_contacted: Some("2025-05-01".to_string()),
            },
            FollowUpClient {
                name: "Ana Ruiz".to_string(),
                email: None,
                status: "New".to_string(),
                last_contacted: None,
            },
        ];
        let docs = vec![MissingDocument {
            name: "Maria Lopez".to_string(),
            doc_type: "Payslip".to_string(),
        }];
        let appts = vec![Appointment {
            id: 1,
            name: "John Smith".to_string(),
            title: "Rate review".to_string(),
            datetime: "2025-06-10 15:00".to_string(),
        }];

        let prompt = format_prompt(&followups, &docs, &appts);
        assert!(prompt.contains(
            "John Smith (Pre-Approval) - Last contacted: 2025-05-01\nAna Ruiz (New) - Last contacted: never\n"
        ));
        assert!(prompt.contains("Maria Lopez is missing Payslip"));
        assert!(prompt.contains("John Smith \u{2013} Rate review at 2025-06-10 15:00"));
    }

    #[test]
    fn test_section_order() {
        let prompt = format_prompt(&[], &[], &[]);
        let f = prompt.find("Follow-Up").unwrap();
        let d = prompt.find("Missing Documents").unwrap();
        let a = prompt.find("Upcoming Appointments").unwrap();
        assert!(f < d && d < a);
    }
}
