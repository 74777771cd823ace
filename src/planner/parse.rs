//! Turn free-text model output into typed tasks.
//!
//! Each line is classified by keyword and stripped of list markers.
//! No AI needed, just ordered substring rules.

use crate::types::{Task, TaskType};

/// Ordered classification rules. First match wins; no match means email.
const RULES: &[(&[&str], TaskType)] = &[
    (&["email"], TaskType::Email),
    (&["call", "meeting"], TaskType::Calendar),
    (&["update", "log"], TaskType::Crm),
];

const FALLBACK_TYPE: TaskType = TaskType::Email;

/// List markers stripped from both ends of a line.
const MARKER_CHARS: &[char] = &['-', '\u{2022}', '1', '2', '3', '.', ' '];

/// Classify one line of model output (case-insensitive).
pub fn classify_line(line: &str) -> TaskType {
    let lowered = line.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, task_type)| *task_type)
        .unwrap_or(FALLBACK_TYPE)
}

/// Strip list markers and whitespace from both ends.
pub fn clean_line(line: &str) -> String {
    line.trim_matches(|c: char| c.is_whitespace() || MARKER_CHARS.contains(&c))
        .to_string()
}

/// Parse every line, in order. Blank lines become empty-content tasks.
pub fn parse_tasks(raw: &str) -> Vec<Task> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split('\n')
        .map(|line| Task::new(classify_line(line), clean_line(line)))
        .collect()
}

/// Parse a plan for dispatch, dropping tasks with no content.
pub fn parse_plan(raw: &str) -> Vec<Task> {
    parse_tasks(raw)
        .into_iter()
        .filter(|task| !task.content.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_keyword_wins_over_others() {
        assert_eq!(classify_line("Call and EMAIL John"), TaskType::Email);
        assert_eq!(classify_line("Update log then email"), TaskType::Email);
    }

    #[test]
    fn test_keyword_rules() {
        assert_eq!(classify_line("Schedule a meeting with Ana"), TaskType::Calendar);
        assert_eq!(classify_line("CALL the lender"), TaskType::Calendar);
        assert_eq!(classify_line("Log the rate lock"), TaskType::Crm);
        assert_eq!(classify_line("Update notes for a@b.com: x"), TaskType::Crm);
    }

    #[test]
    fn test_no_keyword_falls_back_to_email() {
        assert_eq!(classify_line("Review the pipeline"), TaskType::Email);
        assert_eq!(classify_line(""), TaskType::Email);
    }

    #[test]
    fn test_substring_matching() {
        // "recall" contains "call"; substring rules are intended
        assert_eq!(classify_line("Recall the appraisal"), TaskType::Calendar);
        // "blog" contains "log"
        assert_eq!(classify_line("Read the blog"), TaskType::Crm);
    }

    #[test]
    fn test_clean_line_strips_markers() {
        assert_eq!(clean_line("1. Call John about refinance"), "Call John about refinance");
        assert_eq!(clean_line("\u{2022} Email Jane"), "Email Jane");
        assert_eq!(clean_line("  - Update notes.  "), "Update notes");
        assert_eq!(clean_line("\t3. Send docs\r"), "Send docs");
    }

    #[test]
    fn test_clean_line_strips_trailing_marker_digits() {
        assert_eq!(clean_line("Meet at 3"), "Meet at");
        assert_eq!(clean_line("Call 555-0123"), "Call 555-0");
    }

    #[test]
    fn test_clean_line_is_idempotent() {
        for line in [
            "1. Call John",
            "\t- \u{2022} 2. Email Jane 3.",
            "   ",
            "123",
            "- Update notes for a@b.com: ok -",
            " \t1.\t Log call",
        ] {
            let once = clean_line(line);
            assert_eq!(clean_line(&once), once, "not idempotent for {:?}", line);
        }
    }

    #[test]
    fn test_parse_scenario_three_tasks() {
        let raw = "1. Call John about refinance\n2. Update notes for client@example.com: Needs follow-up\n3. Email Jane to request documents";
        assert_eq!(
            parse_tasks(raw),
            vec![
                Task::new(TaskType::Calendar, "Call John about refinance"),
                Task::new(
                    TaskType::Crm,
                    "Update notes for client@example.com: Needs follow-up"
                ),
                Task::new(TaskType::Email, "Email Jane to request documents"),
            ]
        );
    }

    #[test]
    fn test_empty_response_yields_no_tasks() {
        assert!(parse_tasks("").is_empty());
        assert!(parse_tasks("  \n\n ").is_empty());
    }

    #[test]
    fn test_blank_inner_lines_kept_by_parse_tasks_dropped_by_parse_plan() {
        let raw = "1. Call John\n\n2. Email Jane\n-";
        let tasks = parse_tasks(raw);
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[1], Task::new(TaskType::Email, ""));
        assert_eq!(tasks[3].content, "");

        let plan = parse_plan(raw);
        assert_eq!(
            plan,
            vec![
                Task::new(TaskType::Calendar, "Call John"),
                Task::new(TaskType::Email, "Email Jane"),
            ]
        );
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let plan = parse_plan("Email Jane\nEmail Jane");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], plan[1]);
    }
}
