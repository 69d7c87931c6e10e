use serde::Serialize;

/// Axis-aligned box in PDF page space (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl Rect {
    #[must_use]
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        Self { llx, lly, urx, ury }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        (self.urx - self.llx).abs()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.ury - self.lly).abs()
    }
}

#[must_use]
pub fn union(a: &Rect, b: &Rect) -> Rect {
    Rect {
        llx: a.llx.min(b.llx),
        lly: a.lly.min(b.lly),
        urx: a.urx.max(b.urx),
        ury: a.ury.max(b.ury),
    }
}

#[must_use]
pub fn area(rect: &Rect) -> f64 {
    (rect.width() * rect.height()).abs()
}

/// `(joint - separate) / (joint + separate)`: below zero the two extents
/// share space, above zero there is a gap between them, zero means touching.
fn normalized_gap(joint: f64, separate: f64) -> f64 {
    let total = joint + separate;
    if total == 0.0 {
        return 0.0;
    }
    (joint - separate) / total
}

/// Area based overlap, used to decide whether two glyphs belong to one word.
#[must_use]
pub fn overlap(a: &Rect, b: &Rect) -> f64 {
    normalized_gap(area(&union(a, b)), area(a) + area(b))
}

/// Overlap of the vertical extents only: do `a` and `b` sit on one text line?
#[must_use]
pub fn line_overlap(a: &Rect, b: &Rect) -> f64 {
    normalized_gap(union(a, b).height(), a.height() + b.height())
}

/// Overlap of the horizontal extents only: do `a` and `b` share a column?
#[must_use]
pub fn column_overlap(a: &Rect, b: &Rect) -> f64 {
    normalized_gap(union(a, b).width(), a.width() + b.width())
}
