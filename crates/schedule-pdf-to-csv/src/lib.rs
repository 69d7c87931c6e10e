mod cluster;
mod csv_out;
mod error;
mod geometry;
mod header;
mod markup;
mod merge;
mod model;
mod options;
mod patterns;
mod pdf_reader;
mod repair;
mod segment;
mod table;
mod warning;

use std::path::Path;

use crate::header::extract_header;
use crate::merge::{aligned_date_band, merge_header};
use crate::pdf_reader::read_page;
use crate::repair::{needs_repair, repair_rows};
use crate::table::build_grid;

pub use cluster::{cluster_columns, cluster_lines};
pub use csv_out::{read_csv_records, write_csv, write_csv_to_string};
pub use error::{ExtractError, RepairError};
pub use geometry::{Rect, area, column_overlap, line_overlap, overlap, union};
pub use header::{DATE_ROW_WIDTH, extract_header as parse_header_block};
pub use markup::{MarkupGroup, MarkupKind, PageMarkup};
pub use model::{Column, GlyphMark, Grid, HeaderBlock, Line, ScheduleTable, Word};
pub use options::{AmbiguityPolicy, ExtractOptions};
pub use patterns::normalize_cell;
pub use pdf_reader::{PageContent, read_page_glyphs};
pub use repair::{EXPECTED_WIDTH, MERGED_COLUMN, SplitNote, SplitOutcome, split_shift_cell};
pub use segment::{DEFAULT_WORD_THRESHOLD, segment_words};
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

use crate::warning::WarningCode;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// Rows below the date row.
    pub row_count: usize,
    pub column_count: usize,
    pub repaired: bool,
    pub warnings: Vec<ExtractWarning>,
}

/// A schedule table together with what was learned while building it.
#[derive(Debug, Clone)]
pub struct ExtractedSchedule {
    pub table: ScheduleTable,
    pub title: Option<String>,
    pub markup: PageMarkup,
    pub report: ExtractionReport,
}

/// Builds the schedule table from a page's text and glyph marks.
///
/// # Errors
///
/// * [`ExtractError::InvalidOption`] for options that fail validation.
/// * [`ExtractError::HeaderDates`] if the page text lacks the seven dates.
/// * [`ExtractError::EmptyTable`] if no body lines were found.
/// * [`ExtractError::Repair`] if a merged column cannot be split.
/// * [`ExtractError::MalformedRow`] if the table is still ragged afterwards.
pub fn extract_table_from_parts(
    text: &str,
    marks: &[GlyphMark],
    page: u32,
    options: &ExtractOptions,
) -> Result<ExtractedSchedule, ExtractError> {
    options.validate()?;

    let header = extract_header(text)?;
    let mut markup = PageMarkup::new(page);
    let grid = build_grid(marks, options.word_threshold, &mut markup);
    if grid.rows.is_empty() {
        return Err(ExtractError::EmptyTable);
    }

    let mut table = merge_header(&header, &grid);
    let mut warnings = Vec::new();
    let mut repaired = false;
    if options.repair && needs_repair(&table.rows) {
        let date_band = aligned_date_band(&header, &grid);
        table.rows = repair_rows(
            &table.rows,
            date_band.as_deref(),
            options.ambiguity,
            &mut warnings,
        )?;
        repaired = true;
        warnings.push(ExtractWarning::new(
            WarningCode::RepairApplied,
            "merged Friday/Saturday column was split in two",
        ));
    }

    if let Some((row, cells)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != options.expected_width)
    {
        return Err(ExtractError::MalformedRow {
            row,
            expected: options.expected_width,
            found: cells.len(),
        });
    }

    tracing::debug!(
        rows = table.rows.len(),
        repaired,
        warnings = warnings.len(),
        "assembled schedule table"
    );

    let report = ExtractionReport {
        row_count: table.rows.len().saturating_sub(1),
        column_count: table.width(),
        repaired,
        warnings,
    };
    Ok(ExtractedSchedule {
        table,
        title: header.title,
        markup,
        report,
    })
}

/// Reads the configured page of `input_pdf` and builds its schedule table.
///
/// # Errors
///
/// PDF loading errors plus everything [`extract_table_from_parts`] reports.
pub fn extract_schedule_table(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<ExtractedSchedule, ExtractError> {
    options.validate()?;
    let PageContent { page, text, marks } = read_page(input_pdf, options.page)?;
    extract_table_from_parts(&text, &marks, page, options)
}

/// # Errors
///
/// See [`extract_schedule_table`] and [`write_csv_to_string`].
pub fn extract_pdf_bytes_to_csv_string(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<(String, ExtractionReport), ExtractError> {
    let extracted = extract_schedule_table(input_pdf, options)?;
    let csv = write_csv_to_string(&extracted.table, options.delimiter)?;
    Ok((csv, extracted.report))
}

/// # Errors
///
/// See [`extract_schedule_table`] and [`write_csv`].
pub fn extract_pdf_to_csv(
    input_pdf: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let bytes = std::fs::read(input_pdf)?;
    let extracted = extract_schedule_table(&bytes, options)?;
    write_csv(output_csv, &extracted.table, options.delimiter)?;
    Ok(extracted.report)
}

#[cfg(test)]
mod tests {
    use super::extract_table_from_parts;
    use crate::error::{ExtractError, RepairError};
    use crate::geometry::Rect;
    use crate::model::GlyphMark;
    use crate::options::{AmbiguityPolicy, ExtractOptions};
    use crate::warning::WarningCode;

    const TEXT: &str = "Server Schedule\nNey,Conor\n\nMonday 10/9/2023\nTuesday 10/10/2023\nWednesday 10/11/2023\nThursday 10/12/2023\nFriday 10/13/2023\nSaturday 10/14/2023\nSunday 10/15/2023\n\n";

    const DAY_X: [f64; 8] = [20.0, 120.0, 180.0, 240.0, 300.0, 360.0, 420.0, 480.0];

    fn text_marks(text: &str, x: f64, y: f64) -> Vec<GlyphMark> {
        let mut marks = Vec::new();
        let mut left = x;
        for ch in text.chars() {
            if !ch.is_whitespace() {
                marks.push(GlyphMark::new(ch.to_string(), Rect::new(left, y, left + 6.0, y + 10.0)));
            }
            left += 6.0;
        }
        marks
    }

    fn row_marks(cells: &[(usize, &str)], y: f64) -> Vec<GlyphMark> {
        cells
            .iter()
            .flat_map(|(column, text)| text_marks(text, DAY_X[*column], y))
            .collect()
    }

    fn full_week_marks() -> Vec<GlyphMark> {
        let mut marks = row_marks(
            &[
                (1, "10/9/2023"),
                (2, "10/10"),
                (3, "10/11"),
                (4, "10/12"),
                (5, "10/13"),
                (6, "10/14"),
                (7, "10/15"),
            ],
            700.0,
        );
        marks.extend(row_marks(
            &[(0, "Ney,Conor"), (1, "8:30am"), (3, "4:00pm"), (5, "oncall"), (6, "8:30am"), (7, "5:00pm")],
            660.0,
        ));
        marks.extend(row_marks(
            &[(2, "3:45pm"), (4, "oncall"), (5, "5:00pm"), (6, "4:00pm"), (7, "oncall")],
            640.0,
        ));
        marks
    }

    #[test]
    fn assembles_a_full_width_week() {
        let extracted = extract_table_from_parts(TEXT, &full_week_marks(), 1, &ExtractOptions::default())
            .expect("week should extract");

        let table = extracted.table;
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "");
        assert_eq!(table.rows[0][1], "10/9/2023");
        assert_eq!(table.rows[0][7], "10/15/2023");
        assert_eq!(table.rows[1], vec!["Ney,Conor", "8:30am", "", "4:00pm", "", "oncall", "8:30am", "5:00pm"]);
        assert_eq!(table.rows[2], vec!["", "", "3:45pm", "", "oncall", "5:00pm", "4:00pm", "oncall"]);
        assert_eq!(extracted.title.as_deref(), Some("Server Schedule"));
        assert_eq!(extracted.report.row_count, 2);
        assert_eq!(extracted.report.column_count, 8);
        assert!(!extracted.report.repaired);
    }

    fn merged_week_marks() -> Vec<GlyphMark> {
        // Friday and Saturday share one column band.
        let mut marks = row_marks(&[(1, "10/9/2023"), (7, "10/15/2023")], 700.0);
        marks.extend(row_marks(
            &[(0, "Ney,Conor"), (1, "8:30am"), (2, "x"), (3, "x"), (4, "x"), (7, "5:00pm")],
            660.0,
        ));
        marks.extend(text_marks("oncall4:00pm", 360.0, 660.0));
        marks.extend(row_marks(&[(2, "3:45pm"), (7, "oncall")], 640.0));
        marks.extend(text_marks("8:30am", 370.0, 640.0));
        marks
    }

    #[test]
    fn repairs_a_merged_friday_saturday_column() {
        let extracted =
            extract_table_from_parts(TEXT, &merged_week_marks(), 1, &ExtractOptions::default())
                .expect("merged week should be repaired");

        assert!(extracted.report.repaired);
        assert_eq!(extracted.table.rows[1][5], "oncall");
        assert_eq!(extracted.table.rows[1][6], "4:00pm");
        assert_eq!(extracted.table.rows[2][5], "8:30am");
        assert_eq!(extracted.table.rows[2][6], "");
        assert_eq!(extracted.table.rows[2][7], "oncall");
        assert!(
            extracted
                .report
                .warnings
                .iter()
                .any(|warning| warning.code == WarningCode::RepairApplied)
        );
    }

    #[test]
    fn merge_outside_friday_saturday_is_irreparable() {
        // Monday's cell runs into Tuesday's band, so the two columns fold into one.
        let mut marks = row_marks(&[(1, "10/9/2023"), (2, "10/10/2023")], 700.0);
        marks.extend(row_marks(
            &[(0, "Ney,Conor"), (3, "x"), (4, "x"), (5, "x"), (6, "8:30am"), (7, "5:00pm")],
            660.0,
        ));
        marks.extend(text_marks("oncall4:00pm", 120.0, 660.0));
        marks.extend(row_marks(&[(2, "3:45pm"), (7, "oncall")], 640.0));

        let err = extract_table_from_parts(TEXT, &marks, 1, &ExtractOptions::default())
            .expect_err("monday and tuesday cannot be told apart");
        assert!(matches!(
            err,
            ExtractError::Repair(RepairError::Irreparable { column: 1 })
        ));
    }

    #[test]
    fn ragged_output_without_repair_is_an_error() {
        let options = ExtractOptions {
            repair: false,
            ..ExtractOptions::default()
        };
        let err = extract_table_from_parts(TEXT, &merged_week_marks(), 1, &options)
            .expect_err("7-wide rows must fail");
        assert!(matches!(
            err,
            ExtractError::MalformedRow {
                expected: 8,
                found: 7,
                ..
            }
        ));
    }

    #[test]
    fn reject_policy_surfaces_ambiguous_cells() {
        let mut marks = merged_week_marks();
        marks.retain(|mark| mark.bbox.lly > 650.0);
        marks.extend(text_marks("5:00pm", 370.0, 640.0));
        marks.extend(text_marks("3:45pm", 180.0, 640.0));
        let options = ExtractOptions {
            ambiguity: AmbiguityPolicy::Reject,
            ..ExtractOptions::default()
        };
        let err = extract_table_from_parts(TEXT, &marks, 1, &options).expect_err("must reject");
        assert!(matches!(
            err,
            ExtractError::Repair(RepairError::Ambiguous { row: 2, .. })
        ));
    }

    #[test]
    fn missing_body_is_an_empty_table() {
        let marks = row_marks(&[(1, "10/9/2023"), (2, "10/10/2023")], 700.0);
        let err = extract_table_from_parts(TEXT, &marks, 1, &ExtractOptions::default())
            .expect_err("no body lines");
        assert!(matches!(err, ExtractError::EmptyTable));
    }
}
