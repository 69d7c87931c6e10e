use crate::geometry::{Rect, union};

/// One positioned fragment of page text, usually a single character.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMark {
    pub text: String,
    pub bbox: Rect,
}

impl GlyphMark {
    #[must_use]
    pub fn new(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    marks: Vec<GlyphMark>,
}

impl Word {
    pub(crate) fn from_marks(marks: Vec<GlyphMark>) -> Option<Self> {
        if marks.is_empty() {
            return None;
        }
        Some(Self { marks })
    }

    #[must_use]
    pub fn marks(&self) -> &[GlyphMark] {
        &self.marks
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.marks.iter().map(|mark| mark.text.as_str()).collect()
    }

    #[must_use]
    pub fn bbox(&self) -> Rect {
        let first = self.marks[0].bbox;
        self.marks
            .iter()
            .skip(1)
            .fold(first, |acc, mark| union(&acc, &mark.bbox))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub words: Vec<Word>,
}

impl Line {
    #[must_use]
    pub fn bbox(&self) -> Option<Rect> {
        let mut boxes = self.words.iter().map(Word::bbox);
        let first = boxes.next()?;
        Some(boxes.fold(first, |acc, rect| union(&acc, &rect)))
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(Word::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub bbox: Rect,
}

/// Text that sits above the cell grid in the page text stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderBlock {
    pub title: Option<String>,
    pub row_labels: Vec<String>,
    /// Leading empty placeholder followed by one `M/D/YYYY` date per day.
    pub dates: Vec<String>,
}

/// Cell grid derived from glyph geometry, before header information is added.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    pub rows: Vec<Vec<String>>,
    pub column_count: usize,
    /// The printed date line projected into the same columns as `rows`.
    pub date_band: Option<Vec<String>>,
}

/// Header row followed by one row per table line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleTable {
    pub rows: Vec<Vec<String>>,
}

impl ScheduleTable {
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|row| row.len() == width)
    }
}
