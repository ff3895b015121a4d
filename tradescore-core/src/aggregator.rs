//! Score aggregator: strategy score plus compliance score, out of 100.
//!
//! The compliance axis starts at [`TOTAL_FORBIDDEN_POINTS`] and loses each
//! violation's penalty. Penalties saturate: once the compliance axis reaches
//! zero, further violations cost nothing more.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::{Severity, TOTAL_FORBIDDEN_POINTS};
use crate::detector::ForbiddenRuleViolation;
use crate::evaluator::StrategyScoreResult;

/// Letter grade for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// ≥ 90
    A,
    /// ≥ 80
    B,
    /// ≥ 70
    C,
    /// ≥ 60
    D,
    F,
}

impl Grade {
    pub fn from_score(final_score: f64) -> Self {
        match final_score {
            s if s >= 90.0 => Grade::A,
            s if s >= 80.0 => Grade::B,
            s if s >= 70.0 => Grade::C,
            s if s >= 60.0 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Violation counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationStats {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
    /// Sum of penalties before the compliance cap.
    pub raw_penalty: u32,
}

impl ViolationStats {
    pub fn from_violations(violations: &[ForbiddenRuleViolation]) -> Self {
        violations.iter().fold(Self::default(), |mut stats, v| {
            match v.severity {
                Severity::High => stats.high += 1,
                Severity::Medium => stats.medium += 1,
                Severity::Low => stats.low += 1,
            }
            stats.total += 1;
            stats.raw_penalty = stats.raw_penalty.saturating_add(v.score_penalty);
            stats
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScoreResult {
    pub strategy: StrategyScoreResult,
    pub violations: Vec<ForbiddenRuleViolation>,
    /// 0..=60
    pub strategy_score: f64,
    /// min(40, Σ penalties)
    pub forbidden_penalty: u32,
    /// 40 − forbidden_penalty
    pub compliance_score: u32,
    /// strategy_score + compliance_score, 0..=100
    pub final_score: f64,
    pub grade: Grade,
    pub stats: ViolationStats,
    pub feedback: Vec<String>,
    /// Fingerprint of the catalog that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_fingerprint: Option<String>,
}

/// Combine a strategy evaluation with the violations detected on the same trade.
///
/// A rule is applied once: repeated violations of the same rule code keep
/// only the first occurrence.
pub fn aggregate(
    strategy: StrategyScoreResult,
    mut violations: Vec<ForbiddenRuleViolation>,
) -> FinalScoreResult {
    let mut seen = BTreeSet::new();
    violations.retain(|v| seen.insert(v.rule_code));

    let stats = ViolationStats::from_violations(&violations);
    let forbidden_penalty = stats.raw_penalty.min(TOTAL_FORBIDDEN_POINTS);
    let compliance_score = TOTAL_FORBIDDEN_POINTS - forbidden_penalty;
    let strategy_score = strategy.total_score;
    let final_score = strategy_score + f64::from(compliance_score);
    let feedback = feedback_lines(&strategy, &violations);

    FinalScoreResult {
        strategy_score,
        forbidden_penalty,
        compliance_score,
        final_score,
        grade: Grade::from_score(final_score),
        stats,
        feedback,
        strategy,
        violations,
        catalog_fingerprint: None,
    }
}

fn feedback_lines(
    strategy: &StrategyScoreResult,
    violations: &[ForbiddenRuleViolation],
) -> Vec<String> {
    let mut lines: Vec<String> = violations
        .iter()
        .map(|v| {
            format!(
                "{} violation: {} (-{} points)",
                v.severity, v.description, v.score_penalty
            )
        })
        .collect();

    lines.extend(
        strategy
            .criteria
            .iter()
            .filter(|c| c.score < c.max_points / 2.0)
            .map(|c| {
                format!(
                    "Weak {}: {} scored {:.1} of {:.1}",
                    strategy.strategy, c.description, c.score, c.max_points
                )
            }),
    );

    lines
}
