use crate::cluster::{cluster_columns, cluster_lines};
use crate::geometry::column_overlap;
use crate::markup::PageMarkup;
use crate::model::{Column, GlyphMark, Grid, Line, Word};
use crate::patterns::{DATE_RE, normalize_cell};
use crate::segment::segment_words;

/// Splits off the printed date header band from the lines below it.
///
/// The band is the lowest line holding a date-shaped word; everything above it
/// belongs to the page header and is dropped. Without such a line every line
/// is body.
pub(crate) fn split_date_band(mut lines: Vec<Line>) -> (Option<Line>, Vec<Line>) {
    let band_index = lines.iter().rposition(|line| {
        line.words
            .iter()
            .any(|word| DATE_RE.is_match(&word.text()))
    });
    match band_index {
        Some(index) => {
            let body = lines.split_off(index + 1);
            (lines.pop(), body)
        }
        None => (None, lines),
    }
}

fn nearest_column(word: &Word, columns: &[Column]) -> Option<usize> {
    let bbox = word.bbox();
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| (index, column_overlap(&bbox, &column.bbox)))
        .fold(None, |best: Option<(usize, f64)>, (index, score)| match best {
            Some((_, current)) if score >= current => best,
            _ => Some((index, score)),
        })
        .map(|(index, _)| index)
}

fn project_line(line: &Line, columns: &[Column]) -> Vec<String> {
    let mut cells = vec![Vec::<String>::new(); columns.len()];
    for word in &line.words {
        if let Some(index) = nearest_column(word, columns) {
            cells[index].push(word.text());
        }
    }
    cells
        .into_iter()
        .map(|parts| normalize_cell(&parts.join(" ")))
        .collect()
}

/// Projects every word of every line into the column it overlaps most.
pub(crate) fn project_lines(lines: &[Line], columns: &[Column]) -> Grid {
    Grid {
        rows: lines.iter().map(|line| project_line(line, columns)).collect(),
        column_count: columns.len(),
        date_band: None,
    }
}

/// Runs segmentation, clustering and projection over one page of marks.
pub fn build_grid(marks: &[GlyphMark], word_threshold: f64, markup: &mut PageMarkup) -> Grid {
    let words = segment_words(marks, word_threshold, markup);
    let (band, lines) = split_date_band(cluster_lines(words, markup));
    let columns = cluster_columns(&lines, markup);
    let mut grid = project_lines(&lines, &columns);
    grid.date_band = band.map(|line| project_line(&line, &columns));
    tracing::debug!(
        rows = grid.rows.len(),
        columns = grid.column_count,
        date_band = grid.date_band.is_some(),
        "assembled cell grid"
    );
    grid
}
