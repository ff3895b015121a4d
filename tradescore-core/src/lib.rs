//! TradeScore Core: 100-point trade quality scoring.
//!
//! A trade is graded on two axes:
//! - Strategy criteria (60 points): weighted, strategy-specific criteria
//!   scored from an indicator snapshot
//! - Compliance (40 points): forbidden risk-discipline rules checked against
//!   the trade and the trader's history, each costing a fixed penalty
//!
//! Everything is driven by an immutable, validated [`Catalog`]. Evaluation is
//! pure and synchronous; a [`ScoringEngine`] can be shared across threads.

pub mod aggregator;
pub mod catalog;
pub mod detector;
pub mod domain;
pub mod engine;
pub mod evaluator;

pub use aggregator::{aggregate, FinalScoreResult, Grade, ViolationStats};
pub use catalog::{
    Catalog, CatalogConfig, CatalogError, CriterionCode, ForbiddenRule, NewsEvent, NewsImpact,
    RuleCode, RuleParameters, Severity, StrategyCriterion, TOTAL_FORBIDDEN_POINTS,
    TOTAL_STRATEGY_POINTS,
};
pub use detector::{detect, ForbiddenRuleViolation, ViolationDetail};
pub use domain::{Indicators, InputError, Side, StrategyTag, Trade, TradeId, TrendDirection};
pub use engine::{ScoreRequest, ScoringEngine, ScoringError};
pub use evaluator::{evaluate, CriterionScore, StrategyScoreResult};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn catalog_is_send_sync() {
        assert_send::<Catalog>();
        assert_sync::<Catalog>();
        assert_send::<CatalogConfig>();
        assert_sync::<CatalogConfig>();
        assert_send::<RuleParameters>();
        assert_sync::<RuleParameters>();
    }

    #[test]
    fn engine_is_send_sync() {
        assert_send::<ScoringEngine>();
        assert_sync::<ScoringEngine>();
        assert_send::<ScoreRequest>();
        assert_sync::<ScoreRequest>();
    }

    #[test]
    fn results_are_send_sync() {
        assert_send::<StrategyScoreResult>();
        assert_sync::<StrategyScoreResult>();
        assert_send::<ForbiddenRuleViolation>();
        assert_sync::<ForbiddenRuleViolation>();
        assert_send::<FinalScoreResult>();
        assert_sync::<FinalScoreResult>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<ScoringError>();
        assert_sync::<ScoringError>();
    }
}
