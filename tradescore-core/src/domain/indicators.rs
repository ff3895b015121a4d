//! Indicator snapshot captured at entry time.
//!
//! Every field is optional. A criterion whose inputs are absent scores a
//! ratio of 0 ("not demonstrated"); NaN and infinite values count as absent.

use serde::{Deserialize, Serialize};

use super::trade::{Side, Trade};

/// Higher-timeframe trend direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    #[serde(alias = "neutral")]
    Sideways,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Indicators {
    // ── Breakout ──
    /// Volume of the entry bar.
    pub volume: Option<f64>,
    /// Trailing average volume.
    pub average_volume: Option<f64>,
    /// Close of the entry bar.
    pub close: Option<f64>,
    /// Upper boundary of the range being broken.
    pub prev_range_high: Option<f64>,
    pub stop_loss_within_limit: Option<bool>,

    // ── Trend ──
    pub htf_trend: Option<TrendDirection>,
    /// Direction the trend alignment is judged against. Filled from the
    /// trade's side when scoring a whole trade.
    pub direction: Option<Side>,
    pub pullback_ok: Option<bool>,
    pub trail_stop_correct: Option<bool>,

    // ── Counter-trend ──
    /// Deviation from the mean in standard deviations.
    pub zscore: Option<f64>,
    pub reversal_signal: Option<bool>,
    /// Planned or realized reward-to-risk.
    pub risk_reward: Option<f64>,
}

impl Indicators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `direction` from the trade side unless the snapshot already carries one.
    pub fn with_direction_from(&self, side: Side) -> Self {
        let mut out = self.clone();
        out.direction.get_or_insert(side);
        out
    }

    /// Fill what the trade itself knows: `direction` from its side and, when
    /// no usable close was captured, `close` from its entry price.
    pub fn with_entry_context(&self, trade: &Trade) -> Self {
        let mut out = self.with_direction_from(trade.side);
        if out.close().is_none() {
            out.close = Some(trade.entry_price);
        }
        out
    }

    pub(crate) fn volume(&self) -> Option<f64> {
        finite(self.volume)
    }

    pub(crate) fn average_volume(&self) -> Option<f64> {
        finite(self.average_volume)
    }

    pub(crate) fn close(&self) -> Option<f64> {
        finite(self.close)
    }

    pub(crate) fn prev_range_high(&self) -> Option<f64> {
        finite(self.prev_range_high)
    }

    pub(crate) fn zscore(&self) -> Option<f64> {
        finite(self.zscore)
    }

    pub(crate) fn risk_reward(&self) -> Option<f64> {
        finite(self.risk_reward)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
