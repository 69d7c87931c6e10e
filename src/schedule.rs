use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Weekday};

use crate::error::ScheduleError;
use crate::models::{Shift, WeeklySchedule};

const DATE_FORMAT: &str = "%m/%d/%Y";
const STAMP_FORMAT: &str = "%m/%d/%Y %I:%M%p";

/// `"4:00 PM"` and `"4:00pm"` both become `"4:00pm"`.
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn is_on_call(normalized: &str) -> bool {
    normalized == "oncall"
}

/// Fixed end time for a shift that starts at `start` on `day`.
#[must_use]
pub fn end_label(start: &str, day: Weekday) -> Option<&'static str> {
    match normalize_label(start).as_str() {
        "8:30am" => Some("3:00pm"),
        "11:00am" => Some("4:00pm"),
        "3:45pm" | "4:00pm" => Some("10:00pm"),
        "5:00pm" if matches!(day, Weekday::Fri | Weekday::Sat) => Some("11:30pm"),
        "5:00pm" => Some("10:15pm"),
        _ => None,
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| ScheduleError::Timestamp {
        value: date.to_string(),
    })
}

/// Parses `M/D/YYYY` plus `h:MMam` in the given fixed offset.
///
/// # Errors
///
/// Returns [`ScheduleError::Timestamp`] when the pair does not parse.
pub fn parse_stamp(
    date: &str,
    time: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, ScheduleError> {
    let value = format!("{} {}", date.trim(), normalize_label(time));
    let naive = NaiveDateTime::parse_from_str(&value, STAMP_FORMAT)
        .map_err(|_| ScheduleError::Timestamp {
            value: value.clone(),
        })?;
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or(ScheduleError::Timestamp { value })
}

/// Builds one shift from a start label and the date of its column.
///
/// # Errors
///
/// * [`ScheduleError::Timestamp`] for an unreadable date or time.
/// * [`ScheduleError::UnmappedStartTime`] for a start label with no end rule.
pub fn shift_from_label(
    label: &str,
    date: &str,
    offset: FixedOffset,
) -> Result<Shift, ScheduleError> {
    let day = parse_date(date)?.weekday();
    let end = end_label(label, day).ok_or_else(|| ScheduleError::UnmappedStartTime {
        label: label.to_string(),
        date: date.to_string(),
    })?;

    Ok(Shift {
        day,
        start: parse_stamp(date, label, offset)?,
        end: parse_stamp(date, end, offset)?,
    })
}

/// Reads one employee's week out of the schedule records.
///
/// `records[0]` is the date row. The employee's shifts sit in the row whose
/// first cell equals `key` and in the row right after it. A key that repeats
/// resolves to its last row.
///
/// # Errors
///
/// * [`ScheduleError::EmptyTable`] when there are no records.
/// * [`ScheduleError::EmployeeNotFound`] when no row carries `key`.
/// * Any error from [`shift_from_label`]; no partial schedule is returned.
pub fn interpret_schedule(
    records: &[Vec<String>],
    key: &str,
    offset: FixedOffset,
) -> Result<WeeklySchedule, ScheduleError> {
    let header = records.first().ok_or(ScheduleError::EmptyTable)?;
    let employee_index = records
        .iter()
        .rposition(|row| row.first().is_some_and(|cell| cell == key))
        .ok_or_else(|| ScheduleError::EmployeeNotFound {
            key: key.to_string(),
        })?;

    let mut shifts = Vec::new();
    for row in records.iter().skip(employee_index).take(2) {
        for (column, cell) in row.iter().enumerate().skip(1) {
            if cell.trim().is_empty() || is_on_call(&normalize_label(cell)) {
                continue;
            }
            let date = header.get(column).map_or("", String::as_str);
            shifts.push(shift_from_label(cell, date, offset)?);
        }
    }

    tracing::debug!(key, shifts = shifts.len(), "interpreted weekly schedule");
    Ok(WeeklySchedule {
        employee_key: key.to_string(),
        shifts,
    })
}
