use chrono::NaiveDate;
use schedule_pdf_to_csv::{ExtractError, RepairError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("schedule table has no header row")]
    EmptyTable,

    #[error("could not find the employee in the schedule; looking for {key:?}")]
    EmployeeNotFound { key: String },

    #[error("no end time is known for a shift starting at {label:?} on {date}")]
    UnmappedStartTime { label: String, date: String },

    #[error("cannot read {value:?} as a shift time")]
    Timestamp { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("expected a first and last name separated by one space, got {0:?}")]
    Shape(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error(transparent)]
    Extract(ExtractError),

    #[error(transparent)]
    Repair(#[from] RepairError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("could not add the shift starting {start} to the calendar: {source}")]
    Calendar {
        start: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("search window ends ({before}) before it starts ({after})")]
    SearchWindow { after: NaiveDate, before: NaiveDate },
}

impl From<ExtractError> for SyncError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::Repair(repair) => Self::Repair(repair),
            other => Self::Extract(other),
        }
    }
}

impl SyncError {
    /// Stable identifier for logs and exit reporting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Name(_) => "name_error",
            Self::Http { .. } => "http_error",
            Self::Upstream { .. } => "upstream_error",
            Self::NotFound(_) => "not_found",
            Self::Decode { .. } => "decode_error",
            Self::Extract(_) => "extract_error",
            Self::Repair(_) => "repair_error",
            Self::Schedule(ScheduleError::EmployeeNotFound { .. }) => "employee_not_found",
            Self::Schedule(ScheduleError::UnmappedStartTime { .. }) => "unmapped_start_time",
            Self::Schedule(_) => "schedule_error",
            Self::Calendar { .. } => "calendar_error",
            Self::SearchWindow { .. } => "search_window",
        }
    }

    /// Pipeline stage the error surfaced in.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Name(_) | Self::SearchWindow { .. } => "config",
            Self::Http { .. } | Self::Upstream { .. } | Self::NotFound(_) | Self::Decode { .. } => {
                "mail"
            }
            Self::Extract(_) => "extract",
            Self::Repair(_) => "repair",
            Self::Schedule(ScheduleError::UnmappedStartTime { .. } | ScheduleError::Timestamp { .. }) => {
                "timestamp"
            }
            Self::Schedule(_) => "lookup",
            Self::Calendar { .. } => "calendar",
        }
    }
}
