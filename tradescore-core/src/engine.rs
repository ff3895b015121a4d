//! Scoring engine: the public entry point tying evaluator, detector and
//! aggregator to one validated catalog.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::aggregator::{aggregate, FinalScoreResult};
use crate::catalog::{Catalog, CatalogError, RuleParameters};
use crate::detector::{detect, ForbiddenRuleViolation};
use crate::domain::{Indicators, InputError, StrategyTag, Trade};
use crate::evaluator::{evaluate, StrategyScoreResult};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("configuration error: {0}")]
    Config(#[from] CatalogError),
    #[error("invalid input: {0}")]
    Input(#[from] InputError),
}

/// One self-contained scoring request, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub trade: Trade,
    #[serde(default)]
    pub indicators: Indicators,
    /// The trader's other trades, ordered by entry time.
    #[serde(default)]
    pub history: Vec<Trade>,
    /// Overrides the catalog's parameters for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<RuleParameters>,
}

/// Cheap to clone; clones share the catalog.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<Catalog>,
}

impl ScoringEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn builtin() -> Result<Self, ScoringError> {
        Ok(Self::new(Catalog::builtin()?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn evaluate_strategy(
        &self,
        strategy: StrategyTag,
        indicators: &Indicators,
    ) -> StrategyScoreResult {
        evaluate(&self.catalog, strategy, indicators)
    }

    /// Validates the trade and parameters, then runs every enabled rule.
    pub fn detect_violations(
        &self,
        trade: &Trade,
        history: &[Trade],
        params: &RuleParameters,
    ) -> Result<Vec<ForbiddenRuleViolation>, ScoringError> {
        trade.validate()?;
        params.validate()?;
        Ok(detect(&self.catalog, trade, history, params))
    }

    /// Full 100-point score for one trade.
    ///
    /// When `indicators` carries no direction, the trade's side is used; when
    /// it carries no close, the entry price is used.
    pub fn score_trade(
        &self,
        trade: &Trade,
        indicators: &Indicators,
        history: &[Trade],
        params: &RuleParameters,
    ) -> Result<FinalScoreResult, ScoringError> {
        let violations = self.detect_violations(trade, history, params)?;
        let indicators = indicators.with_entry_context(trade);
        let strategy = self.evaluate_strategy(trade.strategy, &indicators);

        let mut result = aggregate(strategy, violations);
        result.catalog_fingerprint = Some(self.catalog.fingerprint().to_string());

        tracing::debug!(
            trade = %trade.id,
            strategy = %trade.strategy,
            final_score = result.final_score,
            violations = result.stats.total,
            "trade scored"
        );
        Ok(result)
    }

    /// Score a request, falling back to the catalog's parameters.
    pub fn score_request(&self, request: &ScoreRequest) -> Result<FinalScoreResult, ScoringError> {
        let params = request.params.as_ref().unwrap_or(self.catalog.params());
        self.score_trade(&request.trade, &request.indicators, &request.history, params)
    }
}
