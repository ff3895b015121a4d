//! Catalog configuration: the TOML document a catalog is loaded from.
//!
//! Every section is optional; anything omitted falls back to the built-in
//! catalog. Overriding a strategy replaces its whole weight table, so the
//! override must still sum to 1.
//!
//! ```toml
//! [strategies.breakout]
//! volume_confirmed = 0.4
//! breakout_validity = 0.3
//! pullback_control = 0.3
//!
//! [rules.overtrading]
//! penalty = 10
//! severity = "low"
//!
//! [params]
//! max_daily_trades = 6
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::StrategyTag;

use super::criteria::CriterionCode;
use super::params::RuleParameters;
use super::rules::{RuleCode, Severity};
use super::CatalogError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// strategy tag → (criterion code → weight)
    pub strategies: BTreeMap<String, BTreeMap<String, f64>>,
    /// rule code → overrides
    pub rules: BTreeMap<String, RuleConfig>,
    pub params: RuleParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl CatalogConfig {
    /// The built-in catalog written out in full.
    pub fn builtin() -> Self {
        let strategies = StrategyTag::ALL
            .into_iter()
            .map(|tag| {
                let weights = CriterionCode::for_strategy(tag)
                    .map(|code| (code.as_str().to_string(), code.default_weight()))
                    .collect();
                (tag.as_str().to_string(), weights)
            })
            .collect();

        let rules = RuleCode::ALL
            .into_iter()
            .map(|code| {
                (
                    code.as_str().to_string(),
                    RuleConfig {
                        penalty: Some(code.default_penalty()),
                        severity: Some(code.default_severity()),
                        enabled: Some(true),
                    },
                )
            })
            .collect();

        Self {
            strategies,
            rules,
            params: RuleParameters::default(),
        }
    }

    /// Load a catalog config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a catalog config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        toml::from_str(content).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, CatalogError> {
        toml::to_string_pretty(self).map_err(|e| CatalogError::Serialize(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = CatalogConfig::from_toml("").unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn parses_overrides() {
        let config = CatalogConfig::from_toml(
            r#"
            [strategies.trend]
            htf_alignment = 0.5
            pullback_entry = 0.25
            trail_stop_quality = 0.25

            [rules.chasing]
            enabled = false

            [params]
            revenge_trade_window = 45
            "#,
        )
        .unwrap();
        assert_eq!(config.strategies["trend"]["htf_alignment"], 0.5);
        assert_eq!(config.rules["chasing"].enabled, Some(false));
        assert_eq!(config.rules["chasing"].penalty, None);
        assert_eq!(config.params.revenge_trade_window, 45);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = CatalogConfig::from_toml("[scoring]\nmax = 100").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn builtin_toml_roundtrip() {
        let builtin = CatalogConfig::builtin();
        let text = builtin.to_toml().unwrap();
        let back = CatalogConfig::from_toml(&text).unwrap();
        assert_eq!(back, builtin);
    }
}
