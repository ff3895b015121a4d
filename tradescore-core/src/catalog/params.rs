//! Tunable rule parameters and the externally supplied news calendar.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewsImpact {
    #[default]
    High,
    Medium,
    Low,
}

/// A scheduled market event from the caller's news calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub title: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub impact: NewsImpact,
}

impl NewsEvent {
    pub fn high_impact(title: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            time,
            impact: NewsImpact::High,
        }
    }
}

/// Parameters consumed by the forbidden-rule predicates.
///
/// Time windows are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleParameters {
    /// Max position value as a fraction of account equity.
    pub max_position_ratio: f64,
    /// Minutes after a losing exit during which a new entry counts as revenge.
    pub revenge_trade_window: u32,
    /// Only losses on the same symbol trigger a revenge flag.
    pub revenge_same_symbol_only: bool,
    /// Pre-entry move (fraction) beyond which an entry counts as chasing.
    pub chasing_threshold: f64,
    pub max_daily_trades: usize,
    /// Minutes before a high-impact event during which entries are flagged.
    pub news_avoidance_window: u32,
    /// Offset from UTC at which the trader's calendar day starts.
    pub day_boundary_utc_offset_minutes: i32,
    /// `None` means no calendar was supplied and the news rule is skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_events: Option<Vec<NewsEvent>>,
}

impl Default for RuleParameters {
    fn default() -> Self {
        Self {
            max_position_ratio: 0.1,
            revenge_trade_window: 30,
            revenge_same_symbol_only: false,
            chasing_threshold: 0.05,
            max_daily_trades: 10,
            news_avoidance_window: 30,
            day_boundary_utc_offset_minutes: 0,
            news_events: None,
        }
    }
}

impl RuleParameters {
    pub fn with_news_events(mut self, events: Vec<NewsEvent>) -> Self {
        self.news_events = Some(events);
        self
    }

    /// Timezone in which calendar days are counted for overtrading.
    pub fn trading_day_offset(&self) -> Result<FixedOffset, CatalogError> {
        FixedOffset::east_opt(self.day_boundary_utc_offset_minutes.saturating_mul(60)).ok_or(
            CatalogError::InvalidParameter {
                name: "day_boundary_utc_offset_minutes",
                reason: format!(
                    "{} is outside ±1439 minutes",
                    self.day_boundary_utc_offset_minutes
                ),
            },
        )
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.max_position_ratio.is_finite() || self.max_position_ratio <= 0.0 {
            return Err(CatalogError::InvalidParameter {
                name: "max_position_ratio",
                reason: format!("{} must be a positive number", self.max_position_ratio),
            });
        }
        if !self.chasing_threshold.is_finite() || self.chasing_threshold < 0.0 {
            return Err(CatalogError::InvalidParameter {
                name: "chasing_threshold",
                reason: format!("{} must be a non-negative number", self.chasing_threshold),
            });
        }
        self.trading_day_offset()?;
        Ok(())
    }
}
