//! Forbidden rule detector: inspects a trade and its history for
//! risk-discipline violations.
//!
//! Each rule's predicate runs independently against the same read-only
//! context. A predicate either clears the trade, skips for lack of context,
//! or reports one violation, so a rule fires at most once per evaluation.
//! Skipping is never a violation: missing data is not evidence.

mod predicates;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, RuleCode, RuleParameters, Severity};
use crate::domain::{Trade, TradeId};

pub use predicates::predicate_for;

/// Structured evidence attached to a violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationDetail {
    OversizedPosition {
        position_value: f64,
        account_equity: f64,
        ratio: f64,
        limit: f64,
    },
    RevengeTrade {
        prior_trade_id: TradeId,
        prior_exit_time: DateTime<Utc>,
        prior_pnl: f64,
        minutes_since_loss: f64,
    },
    Chasing {
        pre_entry_move: f64,
        threshold: f64,
    },
    Overtrading {
        trading_day: NaiveDate,
        daily_trade_count: usize,
        limit: usize,
    },
    EnterBeforeNews {
        event_title: String,
        event_time: DateTime<Utc>,
        minutes_before_event: f64,
    },
    AverageDown {
        open_positions: usize,
        average_entry: f64,
        entry_price: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenRuleViolation {
    pub rule_code: RuleCode,
    pub description: String,
    pub severity: Severity,
    pub score_penalty: u32,
    /// When the violation was committed: the trade's entry time.
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ViolationDetail>,
}

/// Outcome of one rule predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Clear,
    /// Required context is missing; the rule is not applied.
    Skipped(&'static str),
    Violated(Option<ViolationDetail>),
}

/// Read-only inputs shared by every predicate.
#[derive(Debug)]
pub struct RuleContext<'a> {
    pub trade: &'a Trade,
    /// History without the candidate trade itself.
    pub others: Vec<&'a Trade>,
    pub params: &'a RuleParameters,
}

impl<'a> RuleContext<'a> {
    pub fn new(trade: &'a Trade, history: &'a [Trade], params: &'a RuleParameters) -> Self {
        let others = history.iter().filter(|t| t.id != trade.id).collect();
        Self {
            trade,
            others,
            params,
        }
    }
}

/// Run every enabled catalog rule against `trade`, in catalog order.
///
/// `history` is the trader's other trades, ordered by entry time. It may
/// include the candidate trade itself; it is matched by id and ignored.
pub fn detect(
    catalog: &Catalog,
    trade: &Trade,
    history: &[Trade],
    params: &RuleParameters,
) -> Vec<ForbiddenRuleViolation> {
    let ctx = RuleContext::new(trade, history, params);
    let mut violations = Vec::new();

    for rule in catalog.rules() {
        if !rule.enabled {
            tracing::debug!(rule = %rule.code, trade = %trade.id, "rule disabled");
            continue;
        }
        match predicate_for(rule.code)(&ctx) {
            Detection::Clear => {}
            Detection::Skipped(reason) => {
                tracing::debug!(rule = %rule.code, trade = %trade.id, reason, "rule skipped");
            }
            Detection::Violated(details) => {
                tracing::debug!(
                    rule = %rule.code,
                    trade = %trade.id,
                    penalty = rule.score_penalty,
                    "rule violated"
                );
                violations.push(ForbiddenRuleViolation {
                    rule_code: rule.code,
                    description: rule.description().to_string(),
                    severity: rule.severity,
                    score_penalty: rule.score_penalty,
                    detected_at: trade.entry_time,
                    details,
                });
            }
        }
    }

    violations
}
