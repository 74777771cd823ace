//! Google Calendar API v3: event insert.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{post_json, GoogleApiError};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

// ============================================================================
// Request / response bodies
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct InsertEventBody {
    summary: String,
    start: EventDateTime,
    end: EventDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertEventResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    html_link: Option<String>,
}

/// An event created on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

fn event_body(
    summary: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    time_zone: &str,
) -> InsertEventBody {
    // Naive wall-clock times; Google resolves them in `timeZone`
    let fmt = "%Y-%m-%dT%H:%M:%S";
    InsertEventBody {
        summary: summary.to_string(),
        start: EventDateTime {
            date_time: start.format(fmt).to_string(),
            time_zone: time_zone.to_string(),
        },
        end: EventDateTime {
            date_time: end.format(fmt).to_string(),
            time_zone: time_zone.to_string(),
        },
    }
}

/// `calendars/{id}/events`, with the id percent-encoded as one path segment.
fn events_url(calendar_id: &str) -> Result<Url, GoogleApiError> {
    let mut url = Url::parse(CALENDAR_API_BASE)?;
    url.path_segments_mut()
        .map_err(|_| GoogleApiError::InvalidRequest(CALENDAR_API_BASE.to_string()))?
        .pop_if_empty()
        .extend(["calendars", calendar_id, "events"]);
    Ok(url)
}

/// Insert a single timed event.
pub async fn insert_event(
    access_token: &str,
    calendar_id: &str,
    summary: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
    time_zone: &str,
) -> Result<InsertedEvent, GoogleApiError> {
    if end <= start {
        return Err(GoogleApiError::InvalidRequest(format!(
            "event end {} is not after start {}",
            end, start
        )));
    }

    let created: InsertEventResponse = post_json(
        events_url(calendar_id)?,
        access_token,
        &event_body(summary, start, end, time_zone),
    )
    .await?;
    Ok(InsertedEvent {
        id: created.id,
        html_link: created.html_link,
    })
}
