//! Rule catalog and strategy criteria table.
//!
//! The catalog is built once from a [`CatalogConfig`], validated in one place,
//! and immutable afterwards. A catalog that fails validation is never
//! constructed, so no evaluation can run against a defective configuration.
//!
//! Invariants checked at load:
//! - every strategy has at least one criterion, each weight in (0, 1]
//! - weights per strategy sum to 1 (within [`WEIGHT_SUM_TOLERANCE`])
//! - every criterion/rule code is known and sits under its own strategy
//! - rule parameters are in range

pub mod config;
pub mod criteria;
pub mod params;
pub mod rules;

pub use config::{CatalogConfig, RuleConfig};
pub use criteria::{CriterionCode, StrategyCriterion};
pub use params::{NewsEvent, NewsImpact, RuleParameters};
pub use rules::{ForbiddenRule, RuleCode, Severity};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::domain::StrategyTag;

/// Points available from the strategy axis.
pub const TOTAL_STRATEGY_POINTS: f64 = 60.0;
/// Points available from the compliance axis.
pub const TOTAL_FORBIDDEN_POINTS: u32 = 40;
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Configuration defects. Fatal: surfaced at load, never at evaluation time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown strategy '{0}' in catalog")]
    UnknownStrategy(String),
    #[error("unknown criterion code '{0}'")]
    UnknownCriterion(String),
    #[error("criterion '{criterion}' belongs to strategy '{expected}', not '{found}'")]
    CriterionStrategyMismatch {
        criterion: CriterionCode,
        expected: StrategyTag,
        found: StrategyTag,
    },
    #[error("strategy '{0}' has no criteria")]
    EmptyStrategy(StrategyTag),
    #[error("criterion '{criterion}' weight {weight} is outside (0, 1]")]
    InvalidWeight { criterion: CriterionCode, weight: f64 },
    #[error("weights for strategy '{strategy}' sum to {sum}, expected 1")]
    WeightSum { strategy: StrategyTag, sum: f64 },
    #[error("unknown forbidden rule code '{0}'")]
    UnknownRule(String),
    #[error("invalid rule parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("read catalog config: {0}")]
    Io(String),
    #[error("parse catalog TOML: {0}")]
    Parse(String),
    #[error("serialize catalog: {0}")]
    Serialize(String),
}

/// Validated, immutable catalog of strategy criteria and forbidden rules.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    strategies: BTreeMap<StrategyTag, Vec<StrategyCriterion>>,
    rules: Vec<ForbiddenRule>,
    params: RuleParameters,
    fingerprint: String,
}

impl Catalog {
    /// The built-in catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_config(&CatalogConfig::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        Self::from_config(&CatalogConfig::from_file(path)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        Self::from_config(&CatalogConfig::from_toml(content)?)
    }

    /// Merge `config` over the built-in defaults and validate the result.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        for tag in config.strategies.keys() {
            StrategyTag::from_str(tag).map_err(|_| CatalogError::UnknownStrategy(tag.clone()))?;
        }

        let mut strategies = BTreeMap::new();
        for tag in StrategyTag::ALL {
            let criteria = match config.strategies.get(tag.as_str()) {
                Some(weights) => load_criteria(tag, weights)?,
                None => CriterionCode::for_strategy(tag)
                    .map(|code| StrategyCriterion {
                        code,
                        weight: code.default_weight(),
                    })
                    .collect(),
            };
            validate_weights(tag, &criteria)?;
            strategies.insert(tag, criteria);
        }

        for code in config.rules.keys() {
            RuleCode::from_str(code)?;
        }
        let rules = RuleCode::ALL
            .into_iter()
            .map(|code| {
                let mut rule = ForbiddenRule::builtin(code);
                if let Some(over) = config.rules.get(code.as_str()) {
                    rule.score_penalty = over.penalty.unwrap_or(rule.score_penalty);
                    rule.severity = over.severity.unwrap_or(rule.severity);
                    rule.enabled = over.enabled.unwrap_or(rule.enabled);
                }
                rule
            })
            .collect();

        config.params.validate()?;

        let mut catalog = Self {
            strategies,
            rules,
            params: config.params.clone(),
            fingerprint: String::new(),
        };
        catalog.fingerprint = catalog.compute_fingerprint()?;

        tracing::info!(
            fingerprint = %catalog.fingerprint,
            rules_enabled = catalog.rules.iter().filter(|r| r.enabled).count(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Criteria for a strategy, in catalog order.
    pub fn criteria(&self, strategy: StrategyTag) -> &[StrategyCriterion] {
        self.strategies
            .get(&strategy)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Forbidden rules, in catalog order.
    pub fn rules(&self) -> &[ForbiddenRule] {
        &self.rules
    }

    pub fn rule(&self, code: RuleCode) -> Option<&ForbiddenRule> {
        self.rules.iter().find(|r| r.code == code)
    }

    /// Default rule parameters, used when a caller supplies none.
    pub fn params(&self) -> &RuleParameters {
        &self.params
    }

    /// BLAKE3 hash of the effective configuration. Identical configs share a fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The effective configuration, written out in full.
    pub fn to_config(&self) -> CatalogConfig {
        let strategies = self
            .strategies
            .iter()
            .map(|(tag, criteria)| {
                let weights = criteria
                    .iter()
                    .map(|c| (c.code.as_str().to_string(), c.weight))
                    .collect();
                (tag.as_str().to_string(), weights)
            })
            .collect();
        let rules = self
            .rules
            .iter()
            .map(|r| {
                (
                    r.code.as_str().to_string(),
                    RuleConfig {
                        penalty: Some(r.score_penalty),
                        severity: Some(r.severity),
                        enabled: Some(r.enabled),
                    },
                )
            })
            .collect();
        CatalogConfig {
            strategies,
            rules,
            params: self.params.clone(),
        }
    }

    fn compute_fingerprint(&self) -> Result<String, CatalogError> {
        // BTreeMap keys keep the JSON canonical.
        let json = serde_json::to_string(&self.to_config())
            .map_err(|e| CatalogError::Serialize(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

fn load_criteria(
    strategy: StrategyTag,
    weights: &BTreeMap<String, f64>,
) -> Result<Vec<StrategyCriterion>, CatalogError> {
    let mut criteria = Vec::with_capacity(weights.len());
    for (name, &weight) in weights {
        let code = CriterionCode::from_str(name)?;
        if code.strategy() != strategy {
            return Err(CatalogError::CriterionStrategyMismatch {
                criterion: code,
                expected: code.strategy(),
                found: strategy,
            });
        }
        criteria.push(StrategyCriterion { code, weight });
    }
    criteria.sort_by_key(|c| c.code);
    Ok(criteria)
}

fn validate_weights(
    strategy: StrategyTag,
    criteria: &[StrategyCriterion],
) -> Result<(), CatalogError> {
    if criteria.is_empty() {
        return Err(CatalogError::EmptyStrategy(strategy));
    }
    for c in criteria {
        if !c.weight.is_finite() || c.weight <= 0.0 || c.weight > 1.0 {
            return Err(CatalogError::InvalidWeight {
                criterion: c.code,
                weight: c.weight,
            });
        }
    }
    let sum: f64 = criteria.iter().map(|c| c.weight).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(CatalogError::WeightSum { strategy, sum });
    }
    Ok(())
}
