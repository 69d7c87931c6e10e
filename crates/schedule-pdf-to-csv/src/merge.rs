use std::collections::HashSet;

use crate::model::{Grid, HeaderBlock, ScheduleTable};

/// True when the grid's first column already holds the row labels.
fn grid_has_label_column(header: &HeaderBlock, grid: &Grid) -> bool {
    let labels = header
        .row_labels
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();
    let mut first_cells = grid
        .rows
        .iter()
        .filter_map(|row| row.first())
        .filter(|cell| !cell.is_empty())
        .peekable();

    first_cells.peek().is_some() && first_cells.all(|cell| labels.contains(cell.as_str()))
}

/// Puts the date row on top of the grid and makes sure every row starts with
/// its label. Rows are not padded: a width mismatch is left for the repair
/// step or the CSV writer to report.
pub(crate) fn merge_header(header: &HeaderBlock, grid: &Grid) -> ScheduleTable {
    let mut rows = Vec::with_capacity(grid.rows.len() + 1);
    rows.push(header.dates.clone());

    if grid_has_label_column(header, grid) {
        rows.extend(grid.rows.iter().cloned());
    } else {
        for (index, grid_row) in grid.rows.iter().enumerate() {
            let mut row = Vec::with_capacity(grid_row.len() + 1);
            row.push(header.row_labels.get(index).cloned().unwrap_or_default());
            row.extend(grid_row.iter().cloned());
            rows.push(row);
        }
    }

    ScheduleTable { rows }
}

/// The grid's printed date band, shifted to line up with the merged table's
/// columns.
pub(crate) fn aligned_date_band(header: &HeaderBlock, grid: &Grid) -> Option<Vec<String>> {
    let band = grid.date_band.as_ref()?;
    if grid_has_label_column(header, grid) {
        return Some(band.clone());
    }
    let mut aligned = Vec::with_capacity(band.len() + 1);
    aligned.push(String::new());
    aligned.extend(band.iter().cloned());
    Some(aligned)
}
