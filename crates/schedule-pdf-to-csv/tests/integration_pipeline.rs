mod common;

use common::{placed, positioned_pdf, schedule_page};
use lopdf::Document;
use lopdf::content::Operation;
use schedule_pdf_to_csv::{
    ExtractError, ExtractOptions, GlyphMark, extract_pdf_bytes_to_csv_string, extract_pdf_to_csv,
    extract_schedule_table, extract_table_from_parts, read_csv_records, read_page_glyphs,
    write_csv_to_string,
};
use tempfile::tempdir;

const PAGE_TEXT: &str = "Server Schedule\nNey,Conor\nDoe,Jane\n\nMonday 10/9/2023\nTuesday 10/10/2023\nWednesday 10/11/2023\nThursday 10/12/2023\nFriday 10/13/2023\nSaturday 10/14/2023\nSunday 10/15/2023\n\n";

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn glyphs_of(bytes: &[u8]) -> Vec<GlyphMark> {
    let document = Document::load_mem(bytes).expect("fixture should load");
    let page_id = *document.get_pages().get(&1).expect("page 1 exists");
    read_page_glyphs(&document, page_id).expect("glyphs should be read")
}

#[test]
fn places_courier_glyphs_at_their_pen_positions() {
    let bytes = positioned_pdf(&[placed(120, 660, "8:30am")], Vec::new()).expect("fixture");
    let marks = glyphs_of(&bytes);

    assert_eq!(marks.len(), 6);
    assert_eq!(marks[0].text, "8");
    assert_eq!(marks[5].text, "m");
    assert!(close(marks[0].bbox.llx, 120.0));
    assert!(close(marks[0].bbox.urx, 126.0));
    assert!(close(marks[0].bbox.lly, 660.0));
    assert!(close(marks[0].bbox.ury, 670.0));
    assert!(close(marks[5].bbox.llx, 150.0));
}

#[test]
fn skips_spaces_but_advances_past_them() {
    let bytes = positioned_pdf(&[placed(100, 500, "on call")], Vec::new()).expect("fixture");
    let marks = glyphs_of(&bytes);

    let text = marks.iter().map(|mark| mark.text.as_str()).collect::<String>();
    assert_eq!(text, "oncall");
    assert!(close(marks[2].bbox.llx, 118.0));
}

#[test]
fn applies_the_graphics_matrix() {
    let prefix = vec![
        Operation::new("q", vec![]),
        Operation::new("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()]),
    ];
    let bytes = positioned_pdf(&[placed(10, 20, "A")], prefix).expect("fixture");
    let marks = glyphs_of(&bytes);

    assert_eq!(marks.len(), 1);
    assert!(close(marks[0].bbox.llx, 20.0));
    assert!(close(marks[0].bbox.lly, 40.0));
    assert!(close(marks[0].bbox.urx, 32.0));
    assert!(close(marks[0].bbox.ury, 60.0));
}

fn schedule_runs() -> Vec<(i64, i64, &'static str)> {
    vec![
        (120, 700, "10/9/2023"),
        (480, 700, "10/15/2023"),
        (20, 660, "Ney,Conor"),
        (120, 660, "8:30am"),
        (240, 660, "4:00pm"),
        (420, 660, "8:30am"),
        (480, 660, "5:00pm"),
        (180, 640, "3:45pm"),
        (360, 640, "on call"),
        (420, 640, "4:00pm"),
        (20, 620, "Doe,Jane"),
        (300, 620, "11:00am"),
        (360, 620, "5:00pm"),
        (480, 600, "REQUESTOFF"),
        (120, 600, "3:45pm"),
    ]
}

#[test]
fn content_stream_glyphs_assemble_into_the_weekly_grid() {
    let runs = schedule_runs();
    let placed_runs = runs
        .iter()
        .map(|(x, y, text)| placed(*x, *y, text))
        .collect::<Vec<_>>();
    let bytes = positioned_pdf(&placed_runs, Vec::new()).expect("fixture");
    let marks = glyphs_of(&bytes);

    let extracted = extract_table_from_parts(PAGE_TEXT, &marks, 1, &ExtractOptions::default())
        .expect("schedule should assemble");
    let rows = &extracted.table.rows;

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1], vec!["Ney,Conor", "8:30am", "", "4:00pm", "", "", "8:30am", "5:00pm"]);
    assert_eq!(rows[2], vec!["", "", "3:45pm", "", "", "on call", "4:00pm", ""]);
    assert_eq!(rows[3], vec!["Doe,Jane", "", "", "", "11:00am", "5:00pm", "", ""]);
    assert_eq!(rows[4], vec!["", "3:45pm", "", "", "", "", "", "REQUESTOFF"]);

    let csv = write_csv_to_string(&extracted.table, b',').expect("table is rectangular");
    assert_eq!(read_csv_records(&csv, b',').expect("csv parses"), *rows);
}

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[test]
fn extracts_the_schedule_from_pdf_bytes() {
    let bytes = positioned_pdf(&schedule_page(), Vec::new()).expect("fixture");
    let extracted = extract_schedule_table(&bytes, &ExtractOptions::default())
        .expect("schedule should extract");

    assert_eq!(extracted.title.as_deref(), Some("Server Schedule"));
    let rows = &extracted.table.rows;
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows[0],
        cells(&["", "10/9/2023", "10/10/2023", "10/11/2023", "10/12/2023", "10/13/2023", "10/14/2023", "10/15/2023"])
    );
    assert_eq!(rows[1], cells(&["Ney,Conor", "", "", "", "", "", "8:30am", ""]));
    assert_eq!(rows[2], cells(&["", "", "", "", "", "", "4:00pm", "5:00pm"]));
    assert_eq!(rows[3], cells(&["Doe,Jane", "11:00am", "3:45pm", "4:00pm", "5:00pm", "oncall", "", ""]));
    assert_eq!(extracted.report.row_count, 3);
    assert_eq!(extracted.report.column_count, 8);
    assert!(!extracted.report.repaired);
    assert!(extracted.report.warnings.is_empty());
}

#[test]
fn writes_the_extracted_schedule_as_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("week.pdf");
    let output = dir.path().join("week.csv");
    let bytes = positioned_pdf(&schedule_page(), Vec::new()).expect("fixture");
    std::fs::write(&input, &bytes).expect("fixture should be written");

    let report = extract_pdf_to_csv(&input, &output, &ExtractOptions::default())
        .expect("csv should be written");
    assert_eq!(report.row_count, 3);

    let written = std::fs::read_to_string(&output).expect("csv should exist");
    let (in_memory, _) = extract_pdf_bytes_to_csv_string(&bytes, &ExtractOptions::default())
        .expect("csv string should be produced");
    assert_eq!(written, in_memory);

    let lines = written.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], ",10/9/2023,10/10/2023,10/11/2023,10/12/2023,10/13/2023,10/14/2023,10/15/2023");
    assert_eq!(lines[1], "\"Ney,Conor\",,,,,,8:30am,");
}

#[test]
fn rejects_missing_pages() {
    let bytes = positioned_pdf(&[placed(10, 10, "x")], Vec::new()).expect("fixture");
    let options = ExtractOptions {
        page: 3,
        ..ExtractOptions::default()
    };
    let err = extract_schedule_table(&bytes, &options).expect_err("page 3 does not exist");
    assert!(matches!(err, ExtractError::NoPages(3)));
}

#[test]
fn rejects_bytes_that_are_not_a_pdf() {
    let err = extract_schedule_table(b"not a pdf", &ExtractOptions::default())
        .expect_err("garbage must fail");
    assert!(matches!(err, ExtractError::PdfLoad(_)));
}

#[test]
fn undated_page_writes_no_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("undated.pdf");
    let output = dir.path().join("undated.csv");

    let bytes = positioned_pdf(&[placed(50, 700, "Server Schedule")], Vec::new())
        .expect("fixture");
    std::fs::write(&input, bytes).expect("fixture should be written");

    let err = extract_pdf_to_csv(&input, &output, &ExtractOptions::default())
        .expect_err("a page without dates has no header");
    assert!(matches!(err, ExtractError::HeaderDates { expected: 8, .. }));
    assert!(!output.exists());
}
