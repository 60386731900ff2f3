use chrono::{Datelike, NaiveDate, TimeDelta};

/// The period a request covers.
///
/// The HTTP provider wants explicit calendar dates, while the reporting provider also
/// understands relative expressions such as `7daysAgo` and `today`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateRange {
    /// Inclusive start and end dates
    Explicit { start: NaiveDate, end: NaiveDate },

    /// Provider-interpreted relative bounds
    Relative { start: String, end: String },
}

impl DateRange {
    #[must_use]
    pub const fn explicit(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Explicit { start, end }
    }

    #[must_use]
    pub fn relative(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Relative {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The Monday-to-Sunday week containing `today`.
    #[must_use]
    pub fn this_week(today: NaiveDate) -> Self {
        let start = today - TimeDelta::days(i64::from(today.weekday().num_days_from_monday()));
        Self::Explicit {
            start,
            end: start + TimeDelta::days(6),
        }
    }

    /// The Monday-to-Sunday week before the one containing `today`.
    #[must_use]
    pub fn last_week(today: NaiveDate) -> Self {
        Self::this_week(today - TimeDelta::days(7))
    }

    /// The seven days up to and including today.
    #[must_use]
    pub fn trailing_week() -> Self {
        Self::relative("7daysAgo", "today")
    }

    /// The seven days before [`trailing_week`](Self::trailing_week).
    #[must_use]
    pub fn preceding_week() -> Self {
        Self::relative("14daysAgo", "7daysAgo")
    }

    /// Start and end bounds rendered as strings.
    #[must_use]
    pub fn bounds(&self) -> (String, String) {
        match self {
            Self::Explicit { start, end } => (start.format("%Y-%m-%d").to_string(), end.format("%Y-%m-%d").to_string()),
            Self::Relative { start, end } => (start.clone(), end.clone()),
        }
    }

    /// The `start,end` form used by the `date` query parameter.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        let (start, end) = self.bounds();
        format!("{start},{end}")
    }
}
