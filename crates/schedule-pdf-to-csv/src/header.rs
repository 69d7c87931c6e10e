use crate::error::ExtractError;
use crate::model::HeaderBlock;

/// Entries in the date row: one empty placeholder plus seven days.
pub const DATE_ROW_WIDTH: usize = 8;

/// Drops a leading weekday word from lines shaped like `Tuesday 10/17/2023`.
fn strip_weekday(token: &str) -> &str {
    match token.find(' ') {
        Some(index) if index > 0 => &token[index + 1..],
        _ => token,
    }
}

fn is_date_token(token: &str) -> bool {
    token.contains('/') && !token.contains("day")
}

/// Reads the names and dates that the page text carries outside the grid.
///
/// Leading blank lines are skipped. The first run of non-empty lines holds the
/// schedule title followed by the row labels; the next run holds the dates.
///
/// # Errors
///
/// Returns [`ExtractError::HeaderDates`] unless exactly seven dates are found.
pub fn extract_header(text: &str) -> Result<HeaderBlock, ExtractError> {
    let mut lines = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .skip_while(|line| line.trim().is_empty());

    let mut label_block = Vec::new();
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        label_block.push(line.trim().to_string());
    }

    let mut dates = vec![String::new()];
    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        let token = strip_weekday(line.trim());
        if is_date_token(token) {
            dates.push(token.to_string());
        }
    }

    if dates.len() != DATE_ROW_WIDTH {
        return Err(ExtractError::HeaderDates {
            expected: DATE_ROW_WIDTH,
            found: dates.len(),
        });
    }

    let mut labels = label_block.into_iter();
    let title = labels.next();
    Ok(HeaderBlock {
        title,
        row_labels: labels.collect(),
        dates,
    })
}
