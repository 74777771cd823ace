//! Calendar events from task content.
//!
//! Start time comes from the content when it names one: an ISO datetime
//! (`2025-06-10T15:00`), or a clock time (`at 3pm`, `at 15:30`) optionally
//! with `today`/`tomorrow`. Otherwise the configured default slot is used.
//! A time that has already passed today moves to tomorrow unless the content
//! said `today`.

use std::sync::OnceLock;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

use super::{HandlerError, HandlerOutcome};
use crate::collaborators::{CalendarScheduler, EventRequest};
use crate::config::CalendarConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayWord {
    Today,
    Tomorrow,
}

fn iso_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"\b(\d{4}-\d{2}-\d{2})[T ](\d{1,2}):(\d{2})(?::(\d{2}))?").ok()
        })
        .as_ref()
}

fn clock_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\bat\s+(\d{1,2})(?::(\d{2}))?\s*([ap]\.?m\.?)?(?:\W|$)").ok())
        .as_ref()
}

fn day_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b(today|tomorrow)\b").ok())
        .as_ref()
}

fn find_iso(content: &str) -> Option<NaiveDateTime> {
    let caps = iso_pattern()?.captures(content)?;
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d").ok()?;
    let hour: u32 = caps.get(2)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(3)?.as_str().parse().ok()?;
    let second: u32 = match caps.get(4) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };
    Some(date.and_time(NaiveTime::from_hms_opt(hour, minute, second)?))
}

fn find_clock(content: &str) -> Option<NaiveTime> {
    let caps = clock_pattern()?.captures(content)?;
    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute_match = caps.get(2);
    let meridiem = caps.get(3).map(|m| m.as_str().to_lowercase());

    // A bare number ("at 3") is too ambiguous to be a time
    if minute_match.is_none() && meridiem.is_none() {
        return None;
    }

    let minute: u32 = match minute_match {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    let hour = match meridiem.as_deref().map(|m| m.starts_with('p')) {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn find_day(content: &str) -> Option<DayWord> {
    let caps = day_pattern()?.captures(content)?;
    match caps.get(1)?.as_str().to_lowercase().as_str() {
        "today" => Some(DayWord::Today),
        "tomorrow" => Some(DayWord::Tomorrow),
        _ => None,
    }
}

fn resolve_start(content: &str, now: NaiveDateTime, config: &CalendarConfig) -> Option<NaiveDateTime> {
    if let Some(explicit) = find_iso(content) {
        return Some(explicit);
    }

    let default_slot =
        NaiveTime::from_hms_opt(config.default_hour.min(23), 0, 0).unwrap_or_default();
    let time = find_clock(content).unwrap_or(default_slot);

    let today = now.date();
    match find_day(content) {
        Some(DayWord::Tomorrow) => Some(today.succ_opt()?.and_time(time)),
        Some(DayWord::Today) => Some(today.and_time(time)),
        None => {
            let candidate = today.and_time(time);
            if candidate <= now {
                candidate.checked_add_days(Days::new(1))
            } else {
                Some(candidate)
            }
        }
    }
}

/// Build the event for a calendar task. `now` is wall-clock in the configured zone.
///
/// `None` when the start or end falls outside the representable date range.
pub fn parse_event_request(
    content: &str,
    now: NaiveDateTime,
    config: &CalendarConfig,
) -> Option<EventRequest> {
    let start = resolve_start(content, now, config)?;
    let end = start.checked_add_signed(Duration::try_minutes(config.duration_minutes)?)?;
    Some(EventRequest {
        title: content.trim().to_string(),
        start,
        end,
        time_zone: config.time_zone.clone(),
        calendar_id: config.calendar_id.clone(),
    })
}

/// Current wall-clock time in the configured zone (UTC if the name is unknown).
pub fn now_in_zone(time_zone: &str) -> NaiveDateTime {
    match time_zone.parse::<chrono_tz::Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).naive_local(),
        Err(_) => {
            log::warn!("Unknown time zone '{}', using UTC", time_zone);
            Utc::now().naive_utc()
        }
    }
}

pub async fn handle_calendar(
    content: &str,
    scheduler: &(dyn CalendarScheduler + Send + Sync),
    config: &CalendarConfig,
    now: NaiveDateTime,
) -> Result<HandlerOutcome, HandlerError> {
    let Some(request) = parse_event_request(content, now, config) else {
        log::error!(
            "Event time out of range for '{}' ({} minutes)",
            content,
            config.duration_minutes
        );
        return Ok(HandlerOutcome::rejected(format!(
            "Event time out of range: {}",
            content.trim()
        )));
    };
    let created = scheduler.schedule(&request).await?;

    let start = request.start.format("%Y-%m-%d %H:%M");
    log::info!(
        "Scheduled '{}' at {} ({}) on {}",
        request.title,
        start,
        request.time_zone,
        request.calendar_id
    );

    let summary = match created.html_link {
        Some(link) => format!("Scheduled '{}' at {} ({})", request.title, start, link),
        None => format!("Scheduled '{}' at {}", request.title, start),
    };
    Ok(HandlerOutcome::completed(summary))
}
