use super::metric_name::Week;
use serde::{Deserialize, Serialize};

/// Visitors for a single page path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub page: String,
    pub visitors: u64,
}

/// Visitors arriving from a single traffic source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source: String,
    pub visitors: u64,
}

/// The provider-independent report consumed by the dashboard.
///
/// A report starts out zeroed and each mapper writes exactly one field. Serialized, it is a
/// JSON object with exactly these six keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedReport {
    pub visitors_this_week: u64,
    pub visitors_last_week: u64,
    pub most_visited_pages_this_week: Vec<PageEntry>,
    pub most_visited_pages_last_week: Vec<PageEntry>,
    pub top_sources_this_week: Vec<SourceEntry>,
    pub top_sources_last_week: Vec<SourceEntry>,
}

impl UnifiedReport {
    #[must_use]
    pub const fn visitors(&self, week: Week) -> u64 {
        match week {
            Week::This => self.visitors_this_week,
            Week::Last => self.visitors_last_week,
        }
    }

    pub const fn visitors_mut(&mut self, week: Week) -> &mut u64 {
        match week {
            Week::This => &mut self.visitors_this_week,
            Week::Last => &mut self.visitors_last_week,
        }
    }

    #[must_use]
    pub fn pages(&self, week: Week) -> &[PageEntry] {
        match week {
            Week::This => &self.most_visited_pages_this_week,
            Week::Last => &self.most_visited_pages_last_week,
        }
    }

    pub const fn pages_mut(&mut self, week: Week) -> &mut Vec<PageEntry> {
        match week {
            Week::This => &mut self.most_visited_pages_this_week,
            Week::Last => &mut self.most_visited_pages_last_week,
        }
    }

    #[must_use]
    pub fn sources(&self, week: Week) -> &[SourceEntry] {
        match week {
            Week::This => &self.top_sources_this_week,
            Week::Last => &self.top_sources_last_week,
        }
    }

    pub const fn sources_mut(&mut self, week: Week) -> &mut Vec<SourceEntry> {
        match week {
            Week::This => &mut self.top_sources_this_week,
            Week::Last => &mut self.top_sources_last_week,
        }
    }

    /// Percentage change in visitors from last week to this week, if last week had any.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "visitor counts are far below 2^52")]
    pub fn visitor_change_percent(&self) -> Option<f64> {
        if self.visitors_last_week == 0 {
            return None;
        }

        let this_week = self.visitors_this_week as f64;
        let last_week = self.visitors_last_week as f64;
        Some((this_week - last_week) / last_week * 100.0)
    }
}
