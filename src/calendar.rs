use serde::Serialize;

use crate::collaborators::CalendarWriter;
use crate::error::SyncError;
use crate::google_api::ApiClient;
use crate::models::{CreatedEvent, EventRequest};

#[derive(Debug, Serialize, PartialEq, Eq)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct EventBody<'a> {
    summary: &'a str,
    location: &'a str,
    start: EventDateTime,
    end: EventDateTime,
}

impl<'a> From<&'a EventRequest> for EventBody<'a> {
    fn from(event: &'a EventRequest) -> Self {
        Self {
            summary: &event.title,
            location: &event.location,
            start: EventDateTime {
                date_time: event.start.to_rfc3339(),
            },
            end: EventDateTime {
                date_time: event.end.to_rfc3339(),
            },
        }
    }
}

/// Google Calendar REST adapter writing into one calendar.
#[derive(Debug, Clone)]
pub struct GoogleCalendar {
    api: ApiClient,
    calendar_id: String,
}

impl GoogleCalendar {
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn new(base_url: &str, access_token: &str, calendar_id: &str) -> Result<Self, SyncError> {
        Ok(Self {
            api: ApiClient::new("calendar", base_url, access_token)?,
            calendar_id: calendar_id.to_string(),
        })
    }

    fn events_path(&self) -> String {
        format!("calendars/{}/events", urlencoding::encode(&self.calendar_id))
    }
}

impl CalendarWriter for GoogleCalendar {
    fn create_event(&self, event: &EventRequest) -> Result<CreatedEvent, SyncError> {
        self.api.post_json(&self.events_path(), &EventBody::from(event))
    }
}
