//! Recovery for tables whose Friday and Saturday columns were merged.
//!
//! When the two day columns overlap on the page, clustering folds them into a
//! single region and every row comes out one cell short. The merged cell sits
//! at [`MERGED_COLUMN`]; this module splits it back into two cells.

use crate::error::RepairError;
use crate::options::AmbiguityPolicy;
use crate::patterns::{SHIFT_TOKEN_RE, date_matches};
use crate::warning::{ExtractWarning, WarningCode};

/// Row label plus seven days.
pub const EXPECTED_WIDTH: usize = 8;

/// Index of the merged Friday/Saturday cell when Monday sits at index 1.
pub const MERGED_COLUMN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub halves: [String; 2],
    pub note: Option<SplitNote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitNote {
    /// The value was placed on one day, or both, without a way to tell which.
    Ambiguous,
    /// Non-empty content that no rule could place was discarded.
    Dropped,
}

impl SplitOutcome {
    fn clean(first: &str, second: &str) -> Self {
        Self {
            halves: [first.to_string(), second.to_string()],
            note: None,
        }
    }

    fn noted(first: &str, second: &str, note: SplitNote) -> Self {
        Self {
            halves: [first.to_string(), second.to_string()],
            note: Some(note),
        }
    }
}

/// Splits the content of a merged Friday/Saturday schedule cell.
#[must_use]
pub fn split_shift_cell(cell: &str) -> SplitOutcome {
    let matches = SHIFT_TOKEN_RE
        .find_iter(cell)
        .map(|found| found.as_str())
        .collect::<Vec<_>>();

    match matches.as_slice() {
        [] if cell.trim().is_empty() => SplitOutcome::clean("", ""),
        [] => SplitOutcome::noted("", "", SplitNote::Dropped),
        [only] if only.contains("am") => SplitOutcome::clean(only, ""),
        [only] if only.contains("pm") => SplitOutcome::noted(only, "", SplitNote::Ambiguous),
        [only] if only.ends_with("call") => {
            SplitOutcome::noted(only, only, SplitNote::Ambiguous)
        }
        [_] => SplitOutcome::noted("", "", SplitNote::Dropped),
        [first, second, ..] => SplitOutcome::clean(first, second),
    }
}

fn names_weekdays(cell: &str) -> bool {
    let lowered = cell.to_ascii_lowercase();
    lowered.contains("friday") || lowered.contains("saturday")
}

fn split_cell(
    row_index: usize,
    cell: &str,
    policy: AmbiguityPolicy,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<[String; 2], RepairError> {
    let dates = date_matches(cell);
    if dates.len() >= 2 {
        return Ok([dates[0].to_string(), dates[1].to_string()]);
    }
    if dates.is_empty() && names_weekdays(cell) {
        return Ok(["Friday".to_string(), "Saturday".to_string()]);
    }

    let outcome = split_shift_cell(cell);
    if let Some(note) = outcome.note {
        if policy == AmbiguityPolicy::Reject {
            return Err(RepairError::Ambiguous {
                row: row_index,
                cell: cell.to_string(),
            });
        }

        let (code, message) = match note {
            SplitNote::Ambiguous => (
                WarningCode::AmbiguousSplit,
                "merged Friday/Saturday value could belong to either day",
            ),
            SplitNote::Dropped => (
                WarningCode::DroppedToken,
                "merged Friday/Saturday value matched no known token and was dropped",
            ),
        };
        tracing::warn!(row = row_index, cell, ?code, "{message}");
        warnings.push(
            ExtractWarning::new(code, format!("{message}: {cell:?}"))
                .with_row(row_index)
                .with_column(MERGED_COLUMN),
        );
    }

    Ok(outcome.halves)
}

/// First column other than [`MERGED_COLUMN`] whose cell holds more than one
/// date.
fn misplaced_merge(header: &[String]) -> Option<usize> {
    header
        .iter()
        .enumerate()
        .filter(|(_, cell)| date_matches(cell).len() > 1)
        .map(|(column, _)| column)
        .find(|&column| column != MERGED_COLUMN)
}

/// Brings every row of `rows` back to [`EXPECTED_WIDTH`] cells.
///
/// `date_band` is the printed date line as laid out in the page's columns.
/// It shows where columns actually merged, since the header row taken from
/// the page text always has one date per cell. Rows that already have the
/// expected width pass through untouched; rows one cell short have the cell
/// at [`MERGED_COLUMN`] split in two.
///
/// # Errors
///
/// * [`RepairError::Irreparable`] if the date band or header row shows merged
///   dates in any other column.
/// * [`RepairError::UnexpectedWidth`] for a row that is neither full width nor
///   exactly one cell short.
/// * [`RepairError::Ambiguous`] under [`AmbiguityPolicy::Reject`].
pub fn repair_rows(
    rows: &[Vec<String>],
    date_band: Option<&[String]>,
    policy: AmbiguityPolicy,
    warnings: &mut Vec<ExtractWarning>,
) -> Result<Vec<Vec<String>>, RepairError> {
    if let Some(column) = date_band
        .into_iter()
        .chain(rows.first().map(Vec::as_slice))
        .find_map(misplaced_merge)
    {
        return Err(RepairError::Irreparable { column });
    }

    let mut repaired = Vec::with_capacity(rows.len());
    let mut split_rows = 0_usize;
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() == EXPECTED_WIDTH {
            repaired.push(row.clone());
            continue;
        }
        if row.len() + 1 != EXPECTED_WIDTH {
            return Err(RepairError::UnexpectedWidth {
                row: row_index,
                expected: EXPECTED_WIDTH,
                found: row.len(),
            });
        }

        let [friday, saturday] = split_cell(row_index, &row[MERGED_COLUMN], policy, warnings)?;
        let mut fixed = Vec::with_capacity(EXPECTED_WIDTH);
        fixed.extend(row[..MERGED_COLUMN].iter().cloned());
        fixed.push(friday);
        fixed.push(saturday);
        fixed.extend(row[MERGED_COLUMN + 1..].iter().cloned());
        repaired.push(fixed);
        split_rows += 1;
    }

    tracing::debug!(split_rows, "repaired merged Friday/Saturday column");
    Ok(repaired)
}

/// True when any row differs from [`EXPECTED_WIDTH`].
#[must_use]
pub fn needs_repair(rows: &[Vec<String>]) -> bool {
    rows.iter().any(|row| row.len() != EXPECTED_WIDTH)
}
