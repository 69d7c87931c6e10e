use std::sync::LazyLock;

use regex::Regex;

pub(crate) static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\d?/\d\d?/\d\d\d\d").expect("hardcoded date regex is valid"));

/// Tokens that can appear in a schedule cell: a clock time, an on-call mark,
/// a time-off request, or a shift/lead role label.
pub(crate) static SHIFT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d\d?:\d\d[apm]{2})|(on ?call)|(REQUESTOFF)|(SHIFT|LEAD)")
        .expect("hardcoded shift token regex is valid")
});

static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded whitespace regex is valid"));

/// NFKC-normalizes `text` and collapses whitespace runs to one space.
pub fn normalize_cell(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;

    let composed = text.nfkc().collect::<String>();
    SPACE_RUN_RE.replace_all(&composed, " ").trim().to_string()
}

pub(crate) fn date_matches(text: &str) -> Vec<&str> {
    DATE_RE.find_iter(text).map(|found| found.as_str()).collect()
}
