use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::InputError;

/// The trading approach a trade is graded against.
///
/// Deserialization goes through `FromStr`, so an unknown tag in a request
/// surfaces as [`InputError::UnknownStrategy`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum StrategyTag {
    Breakout,
    Trend,
    CounterTrend,
}

impl StrategyTag {
    /// Catalog order.
    pub const ALL: [StrategyTag; 3] = [Self::Breakout, Self::Trend, Self::CounterTrend];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakout => "breakout",
            Self::Trend => "trend",
            Self::CounterTrend => "counter_trend",
        }
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyTag {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakout" => Ok(Self::Breakout),
            "trend" => Ok(Self::Trend),
            "counter_trend" | "counter-trend" => Ok(Self::CounterTrend),
            _ => Err(InputError::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for StrategyTag {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
