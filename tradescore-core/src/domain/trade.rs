//! Trade: the record being graded, plus the trader's other trades as history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::strategy::StrategyTag;
use super::InputError;

/// Trade identifier assigned by the trade store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub String);

impl TradeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[serde(alias = "buy", alias = "long")]
    Buy,
    #[serde(alias = "sell", alias = "short")]
    Sell,
}

impl Side {
    /// +1 for buys, -1 for sells. Multiplies a price move into trade-direction terms.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

/// A recorded trade. Immutable once closed; the engine only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub id: TradeId,
    pub symbol: String,
    pub side: Side,
    pub strategy: StrategyTag,

    // ── Entry ──
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_time: DateTime<Utc>,

    // ── Exit ──
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub exit_time: Option<DateTime<Utc>>,

    // ── Risk plan ──
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    /// Account equity when the trade was opened. Needed for position sizing checks.
    #[serde(default)]
    pub account_equity: Option<f64>,
    /// Declared intent to average into an existing position.
    #[serde(default)]
    pub averaging_plan: bool,

    // ── Entry context ──
    /// Signed fractional price change over the window right before entry
    /// (0.07 = price rose 7%).
    #[serde(default)]
    pub pre_entry_move: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Trade {
    /// An open trade with no risk plan or entry context.
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        side: Side,
        strategy: StrategyTag,
        quantity: f64,
        entry_price: f64,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TradeId::new(id),
            symbol: symbol.into(),
            side,
            strategy,
            quantity,
            entry_price,
            entry_time,
            exit_price: None,
            exit_time: None,
            stop_loss: None,
            take_profit: None,
            account_equity: None,
            averaging_plan: false,
            pre_entry_move: None,
            notes: None,
        }
    }

    pub fn closed_at(mut self, exit_price: f64, exit_time: DateTime<Utc>) -> Self {
        self.exit_price = Some(exit_price);
        self.exit_time = Some(exit_time);
        self
    }

    pub fn with_stop_loss(mut self, stop_loss: f64) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    pub fn with_account_equity(mut self, equity: f64) -> Self {
        self.account_equity = Some(equity);
        self
    }

    pub fn with_pre_entry_move(mut self, change: f64) -> Self {
        self.pre_entry_move = Some(change);
        self
    }

    pub fn with_averaging_plan(mut self) -> Self {
        self.averaging_plan = true;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.exit_price.is_some() && self.exit_time.is_some()
    }

    /// Position value at entry.
    pub fn notional(&self) -> f64 {
        self.quantity * self.entry_price
    }

    /// Realized PnL, if the trade has an exit price.
    pub fn realized_pnl(&self) -> Option<f64> {
        self.exit_price
            .map(|exit| (exit - self.entry_price) * self.quantity * self.side.sign())
    }

    pub fn is_loss(&self) -> bool {
        self.realized_pnl().is_some_and(|pnl| pnl < 0.0)
    }

    /// True when the position was entered before `at` and not yet exited at `at`.
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        self.entry_time < at && self.exit_time.map_or(true, |exit| exit > at)
    }

    /// Reject malformed trades: negative or non-finite numbers, exit before entry.
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(InputError::InvalidQuantity {
                trade_id: self.id.clone(),
                value: self.quantity,
            });
        }

        let prices = [
            ("entry_price", Some(self.entry_price)),
            ("exit_price", self.exit_price),
            ("stop_loss", self.stop_loss),
            ("take_profit", self.take_profit),
        ];
        for (field, value) in prices {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(InputError::InvalidPrice {
                        trade_id: self.id.clone(),
                        field,
                        value,
                    });
                }
            }
        }

        if let Some(equity) = self.account_equity {
            if !equity.is_finite() || equity < 0.0 {
                return Err(InputError::InvalidEquity {
                    trade_id: self.id.clone(),
                    value: equity,
                });
            }
        }

        if let Some(change) = self.pre_entry_move {
            if !change.is_finite() {
                return Err(InputError::InvalidPreEntryMove {
                    trade_id: self.id.clone(),
                    value: change,
                });
            }
        }

        if let Some(exit) = self.exit_time {
            if exit < self.entry_time {
                return Err(InputError::ExitBeforeEntry {
                    trade_id: self.id.clone(),
                    entry: self.entry_time,
                    exit,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, min, 0).unwrap()
    }

    fn sample_trade() -> Trade {
        Trade::new("t-1", "BTCUSDT", Side::Buy, StrategyTag::Breakout, 2.0, 100.0, at(9, 30))
    }

    #[test]
    fn pnl_follows_side() {
        let long = sample_trade().closed_at(90.0, at(10, 0));
        assert_eq!(long.realized_pnl(), Some(-20.0));
        assert!(long.is_loss());

        let mut short = sample_trade().closed_at(90.0, at(10, 0));
        short.side = Side::Sell;
        assert_eq!(short.realized_pnl(), Some(20.0));
        assert!(!short.is_loss());
    }

    #[test]
    fn open_trade_has_no_pnl() {
        let trade = sample_trade();
        assert!(!trade.is_closed());
        assert_eq!(trade.realized_pnl(), None);
        assert!(!trade.is_loss());
    }

    #[test]
    fn open_at_window() {
        let trade = sample_trade().closed_at(101.0, at(11, 0));
        assert!(!trade.is_open_at(at(9, 30)));
        assert!(trade.is_open_at(at(10, 0)));
        assert!(!trade.is_open_at(at(11, 0)));
        assert!(sample_trade().is_open_at(at(23, 0)));
    }

    #[test]
    fn validate_accepts_well_formed_trade() {
        let trade = sample_trade()
            .with_stop_loss(95.0)
            .with_account_equity(10_000.0)
            .closed_at(105.0, at(9, 30));
        assert!(trade.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_quantity() {
        let mut trade = sample_trade();
        trade.quantity = -1.0;
        assert!(matches!(
            trade.validate(),
            Err(InputError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_stop_loss() {
        let trade = sample_trade().with_stop_loss(-5.0);
        assert!(matches!(
            trade.validate(),
            Err(InputError::InvalidPrice { field: "stop_loss", .. })
        ));
    }

    #[test]
    fn validate_rejects_nan_entry_price() {
        let mut trade = sample_trade();
        trade.entry_price = f64::NAN;
        assert!(matches!(
            trade.validate(),
            Err(InputError::InvalidPrice { field: "entry_price", .. })
        ));
    }

    #[test]
    fn validate_rejects_exit_before_entry() {
        let trade = sample_trade().closed_at(101.0, at(9, 30) - Duration::minutes(1));
        assert!(matches!(
            trade.validate(),
            Err(InputError::ExitBeforeEntry { .. })
        ));
    }

    #[test]
    fn deserializes_with_optional_fields_omitted() {
        let json = r#"{
            "id": "t-9",
            "symbol": "ETHUSDT",
            "side": "SELL",
            "strategy": "counter_trend",
            "quantity": 1.5,
            "entry_price": 2500.0,
            "entry_time": "2024-03-15T09:30:00Z"
        }"#;
        let trade: Trade = serde_json::from_str(json).unwrap();
        assert_eq!(trade.side, Side::Sell);
        assert_eq!(trade.strategy, StrategyTag::CounterTrend);
        assert_eq!(trade.stop_loss, None);
        assert!(!trade.averaging_plan);
    }
}
