use crate::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The closed set of metrics a report is made of.
///
/// The name travels with a request from descriptor to raw result and selects the mapper
/// that folds the result into the [`UnifiedReport`](super::UnifiedReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    VisitorsThisWeek,
    VisitorsLastWeek,
    MostVisitedPagesThisWeek,
    MostVisitedPagesLastWeek,
    TopSourcesThisWeek,
    TopSourcesLastWeek,
}

/// What a metric measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// A single visitor count
    Visitors,

    /// Visitors broken down by page path
    Pages,

    /// Visitors broken down by traffic source
    Sources,
}

/// Which calendar week a metric covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Week {
    This,
    Last,
}

impl MetricName {
    /// Parse a report name, failing with a mapping error for names outside the closed set.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|e: strum::ParseError| AnalyticsError::mapping(name, format!("unrecognized report name ({e})")))
    }

    #[must_use]
    pub const fn kind(self) -> MetricKind {
        match self {
            Self::VisitorsThisWeek | Self::VisitorsLastWeek => MetricKind::Visitors,
            Self::MostVisitedPagesThisWeek | Self::MostVisitedPagesLastWeek => MetricKind::Pages,
            Self::TopSourcesThisWeek | Self::TopSourcesLastWeek => MetricKind::Sources,
        }
    }

    #[must_use]
    pub const fn week(self) -> Week {
        match self {
            Self::VisitorsThisWeek | Self::MostVisitedPagesThisWeek | Self::TopSourcesThisWeek => Week::This,
            Self::VisitorsLastWeek | Self::MostVisitedPagesLastWeek | Self::TopSourcesLastWeek => Week::Last,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}
