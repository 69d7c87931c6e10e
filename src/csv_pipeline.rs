use chrono::FixedOffset;
use schedule_pdf_to_csv::{
    ExtractOptions, ExtractionReport, extract_pdf_bytes_to_csv_string, read_csv_records,
};

use crate::collaborators::{CalendarWriter, MailSearch, add_weekly_schedule, download_schedule};
use crate::config::Config;
use crate::error::SyncError;
use crate::models::{AttachmentRef, CreatedEvent, WeeklySchedule};
use crate::name_format::schedule_key;
use crate::schedule::interpret_schedule;
use crate::search::SearchCriteria;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Log the shifts instead of creating events.
    pub dry_run: bool,
    pub extract: ExtractOptions,
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub attachment: AttachmentRef,
    pub report: ExtractionReport,
    pub schedule: WeeklySchedule,
    /// Empty in dry-run mode.
    pub events: Vec<CreatedEvent>,
}

/// Extracts the schedule table from a PDF and serializes it as CSV.
///
/// # Errors
///
/// [`SyncError::Extract`] or [`SyncError::Repair`].
pub fn convert_pdf_bytes_to_csv(
    pdf_bytes: &[u8],
    options: &ExtractOptions,
) -> Result<(String, ExtractionReport), SyncError> {
    if pdf_bytes.is_empty() {
        return Err(SyncError::Decode {
            what: "schedule attachment",
            message: "attachment is empty".to_string(),
        });
    }

    let (csv, report) = extract_pdf_bytes_to_csv_string(pdf_bytes, options)?;
    tracing::debug!(
        rows = report.row_count,
        columns = report.column_count,
        repaired = report.repaired,
        "schedule extraction completed"
    );
    for warning in &report.warnings {
        tracing::warn!(
            code = ?warning.code,
            row = ?warning.row,
            column = ?warning.column,
            "{}",
            warning.message
        );
    }
    Ok((csv, report))
}

/// Reads one employee's week out of schedule CSV text.
///
/// # Errors
///
/// [`SyncError::Extract`] for unreadable CSV, [`SyncError::Schedule`] for
/// interpretation failures.
pub fn interpret_csv(
    csv: &str,
    delimiter: u8,
    key: &str,
    offset: FixedOffset,
) -> Result<WeeklySchedule, SyncError> {
    let records = read_csv_records(csv, delimiter)?;
    Ok(interpret_schedule(&records, key, offset)?)
}

/// Find, download, extract, interpret and, unless `dry_run` is set, write
/// the week to the calendar. The first failure aborts the run.
///
/// # Errors
///
/// Any [`SyncError`]; [`SyncError::stage`] names where the run stopped.
pub fn run_sync<M, C>(
    config: &Config,
    criteria: &SearchCriteria,
    mail: &M,
    calendar: &C,
    options: &SyncOptions,
) -> Result<SyncOutcome, SyncError>
where
    M: MailSearch + ?Sized,
    C: CalendarWriter + ?Sized,
{
    let key = schedule_key(&config.employee_name)?;
    let offset = config.utc_offset()?;

    let (attachment, pdf_bytes) = download_schedule(mail, criteria)?;
    let (csv, report) = convert_pdf_bytes_to_csv(&pdf_bytes, &options.extract)?;
    let schedule = interpret_csv(&csv, options.extract.delimiter, &key, offset)?;
    tracing::info!(
        employee = %key,
        shifts = schedule.shifts.len(),
        attachment = %attachment.filename,
        "found weekly schedule"
    );

    let events = if options.dry_run {
        for shift in &schedule.shifts {
            tracing::info!(
                day = ?shift.day,
                start = %shift.start.to_rfc3339(),
                end = %shift.end.to_rfc3339(),
                "dry run: would create event"
            );
        }
        Vec::new()
    } else {
        add_weekly_schedule(
            calendar,
            &schedule,
            &config.calendar.title,
            &config.calendar.location,
        )?
    };

    Ok(SyncOutcome {
        attachment,
        report,
        schedule,
        events,
    })
}
