#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// A merged Friday/Saturday value was placed without knowing its day.
    AmbiguousSplit,
    /// A merged Friday/Saturday value was discarded.
    DroppedToken,
    /// The table needed the Friday/Saturday repair.
    RepairApplied,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractWarning {
    pub code: WarningCode,
    pub message: String,
    pub row: Option<usize>,
    pub column: Option<usize>,
}

impl ExtractWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            row: None,
            column: None,
        }
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }
}
