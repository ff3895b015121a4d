//! Strategy criteria: the weighted technical checks behind the strategy score.
//!
//! Each criterion is a code tagged with a pure ratio rule
//! `fn(&Indicators) -> f64`. Every rule is clamped to [0, 1], is monotonic
//! in its favorable input, and returns 0 when its inputs are absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{Indicators, Side, StrategyTag, TrendDirection};

use super::CatalogError;

/// Volume must reach this multiple of the average for full credit.
pub const VOLUME_CONFIRMATION_MULTIPLE: f64 = 1.5;
/// Close must clear the prior range high by this fraction for full credit.
pub const BREAKOUT_FULL_CLEARANCE: f64 = 0.01;
/// |z| at which deviation credit starts.
pub const DEVIATION_FLOOR: f64 = 2.0;
/// Additional |z| over the floor needed for full credit.
pub const DEVIATION_SPAN: f64 = 1.0;
/// Reward-to-risk at which credit starts.
pub const RISK_REWARD_FLOOR: f64 = 1.5;
/// Additional reward-to-risk over the floor needed for full credit.
pub const RISK_REWARD_SPAN: f64 = 0.5;

/// Pure ratio rule for a criterion.
pub type RatioRule = fn(&Indicators) -> f64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CriterionCode {
    // breakout
    VolumeConfirmed,
    BreakoutValidity,
    PullbackControl,
    // trend
    HtfAlignment,
    PullbackEntry,
    TrailStopQuality,
    // counter-trend
    ExtremeDeviation,
    ReversionConfirmation,
    TightRr,
}

impl CriterionCode {
    /// Catalog order: grouped by strategy, in scoring order.
    pub const ALL: [CriterionCode; 9] = [
        Self::VolumeConfirmed,
        Self::BreakoutValidity,
        Self::PullbackControl,
        Self::HtfAlignment,
        Self::PullbackEntry,
        Self::TrailStopQuality,
        Self::ExtremeDeviation,
        Self::ReversionConfirmation,
        Self::TightRr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VolumeConfirmed => "volume_confirmed",
            Self::BreakoutValidity => "breakout_validity",
            Self::PullbackControl => "pullback_control",
            Self::HtfAlignment => "htf_alignment",
            Self::PullbackEntry => "pullback_entry",
            Self::TrailStopQuality => "trail_stop_quality",
            Self::ExtremeDeviation => "extreme_deviation",
            Self::ReversionConfirmation => "reversion_confirmation",
            Self::TightRr => "tight_rr",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::VolumeConfirmed => "Volume expansion on the breakout bar",
            Self::BreakoutValidity => "Clean break of the prior range high",
            Self::PullbackControl => "Loss limited if the breakout fails",
            Self::HtfAlignment => "Aligned with the higher-timeframe trend",
            Self::PullbackEntry => "Entered on a pullback",
            Self::TrailStopQuality => "Trailing stop managed correctly",
            Self::ExtremeDeviation => "Entered at an extreme deviation",
            Self::ReversionConfirmation => "Reversal signal confirmed",
            Self::TightRr => "Tight stop securing reward-to-risk",
        }
    }

    pub fn strategy(&self) -> StrategyTag {
        match self {
            Self::VolumeConfirmed | Self::BreakoutValidity | Self::PullbackControl => {
                StrategyTag::Breakout
            }
            Self::HtfAlignment | Self::PullbackEntry | Self::TrailStopQuality => {
                StrategyTag::Trend
            }
            Self::ExtremeDeviation | Self::ReversionConfirmation | Self::TightRr => {
                StrategyTag::CounterTrend
            }
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            Self::VolumeConfirmed => 0.30,
            Self::BreakoutValidity => 0.35,
            Self::PullbackControl => 0.35,
            Self::HtfAlignment => 0.40,
            Self::PullbackEntry => 0.30,
            Self::TrailStopQuality => 0.30,
            Self::ExtremeDeviation => 0.35,
            Self::ReversionConfirmation => 0.35,
            Self::TightRr => 0.30,
        }
    }

    pub fn ratio_rule(&self) -> RatioRule {
        match self {
            Self::VolumeConfirmed => volume_confirmed,
            Self::BreakoutValidity => breakout_validity,
            Self::PullbackControl => pullback_control,
            Self::HtfAlignment => htf_alignment,
            Self::PullbackEntry => pullback_entry,
            Self::TrailStopQuality => trail_stop_quality,
            Self::ExtremeDeviation => extreme_deviation,
            Self::ReversionConfirmation => reversion_confirmation,
            Self::TightRr => tight_rr,
        }
    }

    /// Criteria registered for a strategy, in catalog order.
    pub fn for_strategy(strategy: StrategyTag) -> impl Iterator<Item = CriterionCode> {
        Self::ALL
            .into_iter()
            .filter(move |code| code.strategy() == strategy)
    }
}

impl fmt::Display for CriterionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriterionCode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownCriterion(s.to_string()))
    }
}

/// A criterion as loaded into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyCriterion {
    pub code: CriterionCode,
    pub weight: f64,
}

impl StrategyCriterion {
    pub fn ratio(&self, indicators: &Indicators) -> f64 {
        clamp_ratio((self.code.ratio_rule())(indicators))
    }

    pub fn max_points(&self) -> f64 {
        self.weight * super::TOTAL_STRATEGY_POINTS
    }
}

// ─── Ratio rules ─────────────────────────────────────────────────────

fn clamp_ratio(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn flag(value: Option<bool>) -> f64 {
    if value == Some(true) {
        1.0
    } else {
        0.0
    }
}

fn volume_confirmed(ind: &Indicators) -> f64 {
    match (ind.volume(), ind.average_volume()) {
        (Some(volume), Some(avg)) if avg > 0.0 => {
            clamp_ratio(volume / (VOLUME_CONFIRMATION_MULTIPLE * avg))
        }
        _ => 0.0,
    }
}

/// Full credit once the close clears the range high by the full margin;
/// proportional credit below it; nothing at or under the high.
fn breakout_validity(ind: &Indicators) -> f64 {
    match (ind.close(), ind.prev_range_high()) {
        (Some(close), Some(high)) if high > 0.0 => {
            let clearance = (close - high) / high;
            clamp_ratio(clearance / BREAKOUT_FULL_CLEARANCE)
        }
        _ => 0.0,
    }
}

fn pullback_control(ind: &Indicators) -> f64 {
    flag(ind.stop_loss_within_limit)
}

fn htf_alignment(ind: &Indicators) -> f64 {
    match (ind.htf_trend, ind.direction) {
        (Some(TrendDirection::Up), Some(Side::Buy))
        | (Some(TrendDirection::Down), Some(Side::Sell)) => 1.0,
        _ => 0.0,
    }
}

fn pullback_entry(ind: &Indicators) -> f64 {
    flag(ind.pullback_ok)
}

fn trail_stop_quality(ind: &Indicators) -> f64 {
    flag(ind.trail_stop_correct)
}

/// Deviation magnitude counts for both sides: longs fade negative z, shorts positive.
fn extreme_deviation(ind: &Indicators) -> f64 {
    ind.zscore()
        .map(|z| clamp_ratio((z.abs() - DEVIATION_FLOOR) / DEVIATION_SPAN))
        .unwrap_or(0.0)
}

fn reversion_confirmation(ind: &Indicators) -> f64 {
    flag(ind.reversal_signal)
}

fn tight_rr(ind: &Indicators) -> f64 {
    ind.risk_reward()
        .map(|rr| clamp_ratio((rr - RISK_REWARD_FLOOR) / RISK_REWARD_SPAN))
        .unwrap_or(0.0)
}
