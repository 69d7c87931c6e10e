use chrono::{DateTime, FixedOffset, Weekday};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/";
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";
pub const DEFAULT_ATTACHMENT_PATTERN: &str = "^Server Schedule";
pub const DEFAULT_SUBJECT: &str = "Server Schedule";
pub const DEFAULT_EVENT_TITLE: &str = "Work";
/// Eastern daylight time.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub day: Weekday,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// One employee's shifts for one week, in schedule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub employee_key: String,
    pub shifts: Vec<Shift>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub attachment_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
    /// Raw `Date` header, when the message carries one.
    pub date: Option<String>,
    pub snippet: String,
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub title: String,
    pub location: String,
}

impl EventRequest {
    #[must_use]
    pub fn from_shift(shift: &Shift, title: &str, location: &str) -> Self {
        Self {
            start: shift.start,
            end: shift.end,
            title: title.to_string(),
            location: location.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: String,
    #[serde(default, rename = "htmlLink")]
    pub html_link: Option<String>,
}
