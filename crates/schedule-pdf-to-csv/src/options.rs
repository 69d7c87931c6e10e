use crate::error::ExtractError;
use crate::repair::EXPECTED_WIDTH;
use crate::segment::DEFAULT_WORD_THRESHOLD;

/// What the repair step does with a merged cell it cannot place with certainty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Place the value by the fixed rules and report a warning.
    #[default]
    Flag,
    /// Fail the extraction.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// 1-based page holding the schedule.
    pub page: u32,
    pub delimiter: u8,
    pub word_threshold: f64,
    pub expected_width: usize,
    pub repair: bool,
    pub ambiguity: AmbiguityPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            page: 1,
            delimiter: b',',
            word_threshold: DEFAULT_WORD_THRESHOLD,
            expected_width: EXPECTED_WIDTH,
            repair: true,
            ambiguity: AmbiguityPolicy::Flag,
        }
    }
}

impl ExtractOptions {
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidOption`] for a zero page, a non-ASCII or
    /// newline delimiter, a non-finite threshold, or a width the repair step
    /// cannot produce.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.page == 0 {
            return Err(ExtractError::InvalidOption(
                "pages are 1-based".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, b'\n' | b'\r' | b'"') {
            return Err(ExtractError::InvalidOption(format!(
                "delimiter {:?} cannot be used in CSV output",
                char::from(self.delimiter)
            )));
        }
        if !self.word_threshold.is_finite() {
            return Err(ExtractError::InvalidOption(
                "word threshold must be a finite number".to_string(),
            ));
        }
        if self.repair && self.expected_width != EXPECTED_WIDTH {
            return Err(ExtractError::InvalidOption(format!(
                "repair only supports tables {EXPECTED_WIDTH} columns wide"
            )));
        }
        Ok(())
    }
}
