use std::cmp::Ordering;

use crate::geometry::{Rect, column_overlap, line_overlap, union};
use crate::markup::{MarkupKind, PageMarkup};
use crate::model::{Column, Line, Word};

/// Index of the candidate with the most negative score below zero.
/// Equal scores resolve to the earliest candidate.
fn best_match(scores: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, score) in scores.enumerate() {
        if score >= 0.0 {
            continue;
        }
        match best {
            Some((_, current)) if score >= current => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

fn by_left_edge(a: &Rect, b: &Rect) -> Ordering {
    a.llx.partial_cmp(&b.llx).unwrap_or(Ordering::Equal)
}

/// Groups words into lines, sorted top-to-bottom with words left-to-right.
pub fn cluster_lines(words: Vec<Word>, markup: &mut PageMarkup) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();

    for word in words {
        let bbox = word.bbox();
        let target = best_match(
            lines
                .iter()
                .map(|line| line_overlap(&bbox, &line.words[0].bbox())),
        );
        match target {
            Some(index) => lines[index].words.push(word),
            None => lines.push(Line { words: vec![word] }),
        }
    }

    for line in &mut lines {
        line.words
            .sort_by(|a, b| by_left_edge(&a.bbox(), &b.bbox()));
    }
    lines.sort_by(|a, b| {
        let a_bottom = a.words[0].bbox().lly;
        let b_bottom = b.words[0].bbox().lly;
        b_bottom.partial_cmp(&a_bottom).unwrap_or(Ordering::Equal)
    });

    markup.record(MarkupKind::Lines, lines.iter().filter_map(Line::bbox));
    lines
}

struct ColumnCandidate {
    anchor: Rect,
    region: Rect,
}

/// Derives column regions from lines that hold more than one word.
///
/// Single-word lines carry no grid information and are ignored here. After
/// clustering, neighbouring regions that touch or overlap are merged.
pub fn cluster_columns(lines: &[Line], markup: &mut PageMarkup) -> Vec<Column> {
    let mut candidates: Vec<ColumnCandidate> = Vec::new();

    for word in lines
        .iter()
        .filter(|line| line.words.len() > 1)
        .flat_map(|line| line.words.iter())
    {
        let bbox = word.bbox();
        let target = best_match(
            candidates
                .iter()
                .map(|candidate| column_overlap(&bbox, &candidate.anchor)),
        );
        match target {
            Some(index) => {
                let candidate = &mut candidates[index];
                candidate.region = union(&candidate.region, &bbox);
            }
            None => candidates.push(ColumnCandidate {
                anchor: bbox,
                region: bbox,
            }),
        }
    }

    let mut regions = candidates
        .into_iter()
        .map(|candidate| candidate.region)
        .collect::<Vec<_>>();
    regions.sort_by(by_left_edge);

    let mut merged: Vec<Rect> = Vec::with_capacity(regions.len());
    for region in regions {
        match merged.last_mut() {
            Some(previous) if column_overlap(previous, &region) <= 0.0 => {
                *previous = union(previous, &region);
            }
            _ => merged.push(region),
        }
    }

    tracing::debug!(columns = merged.len(), "clustered columns");
    markup.record(MarkupKind::Columns, merged.iter().copied());
    merged.into_iter().map(|bbox| Column { bbox }).collect()
}

#[cfg(test)]
mod tests {
    use super::{best_match, cluster_columns, cluster_lines};
    use crate::geometry::Rect;
    use crate::markup::PageMarkup;
    use crate::model::{GlyphMark, Word};

    fn word(text: &str, x: f64, y: f64) -> Word {
        let width = 6.0 * text.chars().count() as f64;
        Word::from_marks(vec![GlyphMark::new(
            text,
            Rect::new(x, y, x + width, y + 10.0),
        )])
        .expect("non-empty word")
    }

    fn texts(lines: &[crate::model::Line]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|line| line.words.iter().map(Word::text).collect())
            .collect()
    }

    #[test]
    fn best_match_prefers_most_negative_then_earliest() {
        assert_eq!(best_match([0.2, -0.1, -0.3, -0.3].into_iter()), Some(2));
        assert_eq!(best_match([0.0, 0.4].into_iter()), None);
        assert_eq!(best_match(std::iter::empty()), None);
    }

    #[test]
    fn sorts_lines_top_down_and_words_left_to_right() {
        let words = vec![
            word("4:00pm", 200.0, 480.0),
            word("8:30am", 200.0, 500.0),
            word("Ney,Conor", 20.0, 500.0),
            word("5:00pm", 280.0, 481.0),
        ];
        let lines = cluster_lines(words, &mut PageMarkup::new(1));
        assert_eq!(
            texts(&lines),
            vec![
                vec!["Ney,Conor".to_string(), "8:30am".to_string()],
                vec!["4:00pm".to_string(), "5:00pm".to_string()],
            ]
        );
    }

    #[test]
    fn columns_ignore_single_word_lines() {
        let lines = cluster_lines(
            vec![
                word("Server Schedule", 150.0, 700.0),
                word("Ney,Conor", 20.0, 500.0),
                word("8:30am", 200.0, 500.0),
                word("Doe,Jane", 20.0, 480.0),
                word("4:00pm", 200.0, 480.0),
            ],
            &mut PageMarkup::new(1),
        );
        let columns = cluster_columns(&lines, &mut PageMarkup::new(1));
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].bbox.llx, 20.0);
        assert_eq!(columns[1].bbox.llx, 200.0);
    }

    #[test]
    fn merges_touching_neighbour_columns() {
        let separated = cluster_columns(
            &cluster_lines(
                vec![
                    word("AAAA", 0.0, 100.0),
                    word("BBBB", 100.0, 100.0),
                    word("CC", 40.0, 80.0),
                    word("DD", 100.0, 80.0),
                ],
                &mut PageMarkup::new(1),
            ),
            &mut PageMarkup::new(1),
        );
        assert_eq!(separated.len(), 3);

        // "EEEEEEEE" joins the "BBBB" cluster and widens it until it overlaps
        // the "AAAA" cluster, so the merge pass folds the two together.
        let wide = cluster_columns(
            &cluster_lines(
                vec![
                    word("AAAA", 0.0, 100.0),
                    word("BBBB", 30.0, 60.0),
                    word("CCCC", 200.0, 100.0),
                    word("DDDD", 200.0, 60.0),
                    word("EEEEEEEE", 4.0, 20.0),
                    word("FFFF", 200.0, 20.0),
                ],
                &mut PageMarkup::new(1),
            ),
            &mut PageMarkup::new(1),
        );
        assert_eq!(wide.len(), 2);
        assert_eq!(wide[0].bbox.llx, 0.0);
        assert_eq!(wide[0].bbox.urx, 54.0);
    }
}
