use serde::Serialize;

use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    Marks,
    Words,
    Lines,
    Columns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkupGroup {
    pub kind: MarkupKind,
    pub boxes: Vec<Rect>,
}

/// Bounding boxes collected while one page is segmented, for drawing overlays.
///
/// Each segmentation stage appends one group; the accumulator is owned by the
/// caller and handed back next to the extracted table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMarkup {
    pub page: u32,
    pub groups: Vec<MarkupGroup>,
}

impl PageMarkup {
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self {
            page,
            groups: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: MarkupKind, boxes: impl IntoIterator<Item = Rect>) {
        self.groups.push(MarkupGroup {
            kind,
            boxes: boxes.into_iter().collect(),
        });
    }

    #[must_use]
    pub fn boxes(&self, kind: MarkupKind) -> Vec<Rect> {
        self.groups
            .iter()
            .filter(|group| group.kind == kind)
            .flat_map(|group| group.boxes.iter().copied())
            .collect()
    }

    /// # Errors
    ///
    /// Returns an error when the markup cannot be encoded as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
