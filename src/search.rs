use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::error::SyncError;

/// Date bounds of a mailbox search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchWindow {
    Since(NaiveDate),
    Range { after: NaiveDate, before: NaiveDate },
}

impl SearchWindow {
    /// Messages since `lookback_days` before `today`.
    #[must_use]
    pub fn lookback(today: NaiveDate, lookback_days: u32) -> Self {
        let after = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self::Since(after)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::SearchWindow`] when `before` precedes `after`.
    pub fn range(after: NaiveDate, before: NaiveDate) -> Result<Self, SyncError> {
        if before < after {
            return Err(SyncError::SearchWindow { after, before });
        }
        Ok(Self::Range { after, before })
    }
}

#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub sender: String,
    pub subject: String,
    pub window: SearchWindow,
    pub has_attachment: bool,
    /// Filename pattern the schedule attachment must match.
    pub attachment_pattern: Regex,
}

fn gmail_date(date: NaiveDate) -> String {
    date.format("%Y/%-m/%-d").to_string()
}

impl SearchCriteria {
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        window: SearchWindow,
        attachment_pattern: Regex,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            window,
            has_attachment: true,
            attachment_pattern,
        }
    }

    #[must_use]
    pub fn after(&self) -> NaiveDate {
        match self.window {
            SearchWindow::Since(after) | SearchWindow::Range { after, .. } => after,
        }
    }

    #[must_use]
    pub fn before(&self) -> Option<NaiveDate> {
        match self.window {
            SearchWindow::Since(_) => None,
            SearchWindow::Range { before, .. } => Some(before),
        }
    }

    /// Gmail search string, e.g.
    /// `from:(boss@example.com) subject:(Server Schedule) has:attachment after:2023/10/8`.
    #[must_use]
    pub fn query(&self) -> String {
        let mut query = format!("from:({}) subject:({})", self.sender, self.subject);
        if self.has_attachment {
            query.push_str(" has:attachment");
        }
        query.push_str(" after:");
        query.push_str(&gmail_date(self.after()));
        if let Some(before) = self.before() {
            query.push_str(" before:");
            query.push_str(&gmail_date(before));
        }
        query
    }

    #[must_use]
    pub fn matches_attachment(&self, filename: &str) -> bool {
        self.attachment_pattern.is_match(filename)
    }
}
