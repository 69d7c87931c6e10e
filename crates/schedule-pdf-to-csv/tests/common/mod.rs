use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// One text run placed with its own `BT`/`ET` block.
pub struct Placed<'a> {
    pub x: i64,
    pub y: i64,
    pub text: &'a str,
}

pub fn placed(x: i64, y: i64, text: &str) -> Placed<'_> {
    Placed { x, y, text }
}

/// Builds a single-page Courier PDF; `prefix` operations run before the text.
pub fn positioned_pdf(
    runs: &[Placed<'_>],
    prefix: Vec<Operation>,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut operations = prefix;
    for run in runs {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
        operations.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(run.text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    if operations.iter().any(|operation| operation.operator == "q") {
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A complete schedule page: title, row labels and one line per day above a
/// three-line grid. The page text yields the header block and the glyphs
/// below the Sunday line yield an eight-column grid.
pub fn schedule_page() -> Vec<Placed<'static>> {
    let header = [
        "Server Schedule",
        "Ney,Conor",
        "Doe,Jane",
    ];
    let days = [
        "Monday 10/9/2023",
        "Tuesday 10/10/2023",
        "Wednesday 10/11/2023",
        "Thursday 10/12/2023",
        "Friday 10/13/2023",
        "Saturday 10/14/2023",
        "Sunday 10/15/2023",
    ];

    let mut runs = Vec::new();
    for (offset, text) in (0_i64..).zip(header) {
        runs.push(placed(20, 760 - 12 * offset, text));
    }
    for (offset, text) in (0_i64..).zip(days) {
        runs.push(placed(20, 712 - 12 * offset, text));
    }
    runs.extend([
        placed(20, 610, "Ney,Conor"),
        placed(420, 610, "8:30am"),
        placed(420, 590, "4:00pm"),
        placed(480, 590, "5:00pm"),
        placed(20, 570, "Doe,Jane"),
        placed(120, 570, "11:00am"),
        placed(180, 570, "3:45pm"),
        placed(240, 570, "4:00pm"),
        placed(300, 570, "5:00pm"),
        placed(360, 570, "oncall"),
    ]);
    runs
}
