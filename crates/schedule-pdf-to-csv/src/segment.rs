use crate::geometry::overlap;
use crate::markup::{MarkupKind, PageMarkup};
use crate::model::{GlyphMark, Word};

pub const DEFAULT_WORD_THRESHOLD: f64 = 0.1;

fn close_word(current: &mut Vec<GlyphMark>, words: &mut Vec<Word>) {
    let marks = std::mem::take(current);
    let text = marks.iter().map(|mark| mark.text.as_str()).collect::<String>();
    if text.trim().is_empty() {
        return;
    }
    if let Some(word) = Word::from_marks(marks) {
        words.push(word);
    }
}

/// Groups marks into words in encounter order.
///
/// A mark starts a new word when its `overlap` with the previous mark is above
/// `threshold`, i.e. the two are visibly apart rather than adjacent glyphs.
pub fn segment_words(marks: &[GlyphMark], threshold: f64, markup: &mut PageMarkup) -> Vec<Word> {
    markup.record(MarkupKind::Marks, marks.iter().map(|mark| mark.bbox));

    let mut words = Vec::new();
    let mut current: Vec<GlyphMark> = Vec::new();
    let mut last: Option<&GlyphMark> = None;

    for mark in marks {
        if let Some(previous) = last {
            if overlap(&mark.bbox, &previous.bbox) > threshold {
                close_word(&mut current, &mut words);
            }
        }
        current.push(mark.clone());
        last = Some(mark);
    }
    close_word(&mut current, &mut words);

    tracing::debug!(marks = marks.len(), words = words.len(), "segmented words");
    markup.record(MarkupKind::Words, words.iter().map(Word::bbox));
    words
}
