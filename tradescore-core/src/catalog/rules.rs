//! Forbidden rules: universal risk-discipline checks that deduct points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CatalogError;

/// Informational only. Severity never scales a rule's penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleCode {
    NoStoploss,
    OversizedPosition,
    RevengeTrade,
    Chasing,
    Overtrading,
    EnterBeforeNews,
    AvgDownNoPlan,
}

impl RuleCode {
    /// Catalog order. Violations are reported in this order.
    pub const ALL: [RuleCode; 7] = [
        Self::NoStoploss,
        Self::OversizedPosition,
        Self::RevengeTrade,
        Self::Chasing,
        Self::Overtrading,
        Self::EnterBeforeNews,
        Self::AvgDownNoPlan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoStoploss => "no_stoploss",
            Self::OversizedPosition => "oversized_position",
            Self::RevengeTrade => "revenge_trade",
            Self::Chasing => "chasing",
            Self::Overtrading => "overtrading",
            Self::EnterBeforeNews => "enter_before_news",
            Self::AvgDownNoPlan => "avg_down_no_plan",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NoStoploss => "No stop-loss set",
            Self::OversizedPosition => "Position too large for the account",
            Self::RevengeTrade => "Re-entered right after a losing trade",
            Self::Chasing => "Chased an extended price move",
            Self::Overtrading => "Too many trades in one day",
            Self::EnterBeforeNews => "Entered just before high-impact news",
            Self::AvgDownNoPlan => "Averaged down without a plan",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::NoStoploss | Self::OversizedPosition | Self::RevengeTrade => Severity::High,
            Self::AvgDownNoPlan => Severity::High,
            Self::Chasing | Self::Overtrading | Self::EnterBeforeNews => Severity::Medium,
        }
    }

    pub fn default_penalty(&self) -> u32 {
        match self {
            Self::NoStoploss => 30,
            Self::OversizedPosition => 25,
            Self::RevengeTrade => 15,
            Self::Chasing => 15,
            Self::Overtrading => 15,
            Self::EnterBeforeNews => 10,
            Self::AvgDownNoPlan => 25,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownRule(s.to_string()))
    }
}

/// A rule as loaded into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForbiddenRule {
    pub code: RuleCode,
    pub severity: Severity,
    pub score_penalty: u32,
    /// Disabled rules keep their catalog slot but never fire.
    pub enabled: bool,
}

impl ForbiddenRule {
    pub fn builtin(code: RuleCode) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            score_penalty: code.default_penalty(),
            enabled: true,
        }
    }

    pub fn description(&self) -> &'static str {
        self.code.description()
    }
}
