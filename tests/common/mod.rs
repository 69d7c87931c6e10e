use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Text runs of one emailed schedule page, as `(x, y, text)` in points.
const PAGE: &[(i64, i64, &str)] = &[
    (20, 760, "Server Schedule"),
    (20, 748, "Ney,Conor"),
    (20, 736, "Doe,Jane"),
    (20, 712, "Monday 10/9/2023"),
    (20, 700, "Tuesday 10/10/2023"),
    (20, 688, "Wednesday 10/11/2023"),
    (20, 676, "Thursday 10/12/2023"),
    (20, 664, "Friday 10/13/2023"),
    (20, 652, "Saturday 10/14/2023"),
    (20, 640, "Sunday 10/15/2023"),
    (20, 610, "Ney,Conor"),
    (420, 610, "8:30am"),
    (420, 590, "4:00pm"),
    (480, 590, "5:00pm"),
    (20, 570, "Doe,Jane"),
    (120, 570, "11:00am"),
    (180, 570, "3:45pm"),
    (240, 570, "4:00pm"),
    (300, 570, "5:00pm"),
    (360, 570, "oncall"),
];

/// A one-page Courier PDF of the week of 10/9/2023.
pub fn schedule_pdf() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let operations: Vec<Operation> = PAGE
        .iter()
        .flat_map(|&(x, y, text)| {
            [
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ]
        })
        .collect();
    let content = Content { operations }.encode()?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
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
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
