//! Domain types for TradeScore: trades, indicator snapshots, strategy tags.

pub mod indicators;
pub mod strategy;
pub mod trade;

pub use indicators::{Indicators, TrendDirection};
pub use strategy::StrategyTag;
pub use trade::{Side, Trade, TradeId};

use chrono::{DateTime, Utc};

/// Caller-side input defects. The engine rejects the call instead of coercing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("unknown strategy tag '{0}' (expected breakout, trend, or counter_trend)")]
    UnknownStrategy(String),
    #[error("trade {trade_id}: quantity {value} must be a finite, non-negative number")]
    InvalidQuantity { trade_id: TradeId, value: f64 },
    #[error("trade {trade_id}: {field} {value} must be a finite, non-negative number")]
    InvalidPrice {
        trade_id: TradeId,
        field: &'static str,
        value: f64,
    },
    #[error("trade {trade_id}: account equity {value} must be a finite, non-negative number")]
    InvalidEquity { trade_id: TradeId, value: f64 },
    #[error("trade {trade_id}: pre-entry move {value} is not finite")]
    InvalidPreEntryMove { trade_id: TradeId, value: f64 },
    #[error("trade {trade_id}: exit time {exit} precedes entry time {entry}")]
    ExitBeforeEntry {
        trade_id: TradeId,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
    },
}
