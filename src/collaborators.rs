//! The mailbox and calendar the sync talks to, plus the operations built on
//! top of them.

use crate::error::SyncError;
use crate::models::{AttachmentRef, CreatedEvent, EventRequest, MessageSummary, WeeklySchedule};
use crate::search::SearchCriteria;

pub trait MailSearch {
    /// Ids of the messages matching `criteria`, newest first.
    ///
    /// # Errors
    ///
    /// Transport or upstream failures.
    fn list_message_ids(&self, criteria: &SearchCriteria) -> Result<Vec<String>, SyncError>;

    /// # Errors
    ///
    /// Transport or upstream failures, or an unreadable message.
    fn get_message(&self, id: &str) -> Result<MessageSummary, SyncError>;

    /// Raw attachment bytes.
    ///
    /// # Errors
    ///
    /// Transport or upstream failures, or undecodable attachment data.
    fn download_attachment(&self, message_id: &str, attachment_id: &str)
    -> Result<Vec<u8>, SyncError>;
}

pub trait CalendarWriter {
    /// # Errors
    ///
    /// Transport or upstream failures.
    fn create_event(&self, event: &EventRequest) -> Result<CreatedEvent, SyncError>;
}

/// The newest matching message and its schedule attachment.
///
/// # Errors
///
/// [`SyncError::NotFound`] when nothing matches the search or the newest
/// message has no attachment matching the filename pattern.
pub fn find_schedule_attachment<M: MailSearch + ?Sized>(
    mail: &M,
    criteria: &SearchCriteria,
) -> Result<(MessageSummary, AttachmentRef), SyncError> {
    let ids = mail.list_message_ids(criteria)?;
    let newest = ids.first().ok_or_else(|| {
        SyncError::NotFound(format!("no messages match '{}'", criteria.query()))
    })?;
    tracing::debug!(matches = ids.len(), id = %newest, "picked newest schedule message");

    let message = mail.get_message(newest)?;
    let attachment = message
        .attachments
        .iter()
        .find(|attachment| criteria.matches_attachment(&attachment.filename))
        .cloned()
        .ok_or_else(|| {
            SyncError::NotFound(format!(
                "message {} has no attachment matching '{}'",
                message.id,
                criteria.attachment_pattern.as_str()
            ))
        })?;
    Ok((message, attachment))
}

/// Downloads the schedule attachment of the newest matching message.
///
/// # Errors
///
/// See [`find_schedule_attachment`] and [`MailSearch::download_attachment`].
pub fn download_schedule<M: MailSearch + ?Sized>(
    mail: &M,
    criteria: &SearchCriteria,
) -> Result<(AttachmentRef, Vec<u8>), SyncError> {
    let (message, attachment) = find_schedule_attachment(mail, criteria)?;
    let bytes = mail.download_attachment(&message.id, &attachment.attachment_id)?;
    tracing::debug!(
        filename = %attachment.filename,
        bytes = bytes.len(),
        "downloaded schedule attachment"
    );
    Ok((attachment, bytes))
}

/// Every matching message. Messages that fail to load are logged and
/// skipped.
///
/// # Errors
///
/// Only a failure to list the matching ids.
pub fn list_schedule_messages<M: MailSearch + ?Sized>(
    mail: &M,
    criteria: &SearchCriteria,
) -> Result<Vec<MessageSummary>, SyncError> {
    let ids = mail.list_message_ids(criteria)?;
    tracing::info!(count = ids.len(), "processing messages");

    let mut messages = Vec::with_capacity(ids.len());
    for id in &ids {
        match mail.get_message(id) {
            Ok(message) => messages.push(message),
            Err(error) => {
                tracing::warn!(id = %id, code = error.code(), "skipping message: {error}");
            }
        }
    }
    Ok(messages)
}

/// Creates one event per shift, in order, stopping at the first failure.
///
/// # Errors
///
/// [`SyncError::Calendar`] naming the start time of the shift that failed.
pub fn add_weekly_schedule<C: CalendarWriter + ?Sized>(
    calendar: &C,
    schedule: &WeeklySchedule,
    title: &str,
    location: &str,
) -> Result<Vec<CreatedEvent>, SyncError> {
    let mut created = Vec::with_capacity(schedule.shifts.len());
    for shift in &schedule.shifts {
        let request = EventRequest::from_shift(shift, title, location);
        let event = calendar
            .create_event(&request)
            .map_err(|source| SyncError::Calendar {
                start: shift.start.to_rfc3339(),
                source: Box::new(source),
            })?;
        tracing::info!(
            start = %shift.start.to_rfc3339(),
            link = event.html_link.as_deref().unwrap_or(""),
            "event created"
        );
        created.push(event);
    }
    Ok(created)
}
