//! Strategy criteria evaluator: indicators in, weighted technical score out.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CriterionCode, TOTAL_STRATEGY_POINTS};
use crate::domain::{Indicators, StrategyTag};

/// Score of a single criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub code: CriterionCode,
    pub description: String,
    pub weight: f64,
    /// Achievement ratio in [0, 1].
    pub ratio: f64,
    /// `ratio × max_points`.
    pub score: f64,
    /// `weight × TOTAL_STRATEGY_POINTS`.
    pub max_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyScoreResult {
    pub strategy: StrategyTag,
    /// Per-criterion scores in catalog order.
    pub criteria: Vec<CriterionScore>,
    /// Sum of criterion scores, in [0, TOTAL_STRATEGY_POINTS].
    pub total_score: f64,
    pub max_possible_score: f64,
    pub score_percentage: f64,
}

impl StrategyScoreResult {
    pub fn criterion(&self, code: CriterionCode) -> Option<&CriterionScore> {
        self.criteria.iter().find(|c| c.code == code)
    }
}

/// Score `indicators` against every criterion registered for `strategy`.
pub fn evaluate(
    catalog: &Catalog,
    strategy: StrategyTag,
    indicators: &Indicators,
) -> StrategyScoreResult {
    let criteria: Vec<CriterionScore> = catalog
        .criteria(strategy)
        .iter()
        .map(|criterion| {
            let ratio = criterion.ratio(indicators);
            let max_points = criterion.max_points();
            CriterionScore {
                code: criterion.code,
                description: criterion.code.description().to_string(),
                weight: criterion.weight,
                ratio,
                score: ratio * max_points,
                max_points,
            }
        })
        .collect();

    // Weights sum to 1 and ratios are ≤ 1; the clamp only absorbs rounding.
    let total_score = criteria
        .iter()
        .map(|c| c.score)
        .sum::<f64>()
        .clamp(0.0, TOTAL_STRATEGY_POINTS);

    StrategyScoreResult {
        strategy,
        criteria,
        total_score,
        max_possible_score: TOTAL_STRATEGY_POINTS,
        score_percentage: total_score / TOTAL_STRATEGY_POINTS * 100.0,
    }
}
