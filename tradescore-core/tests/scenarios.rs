//! End-to-end scoring scenarios through the public engine API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tradescore_core::{
    CriterionCode, Grade, Indicators, RuleCode, RuleParameters, ScoringEngine, Side, StrategyTag,
    Trade, TrendDirection,
};

fn engine() -> ScoringEngine {
    ScoringEngine::builtin().unwrap()
}

fn open_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap()
}

/// A disciplined trade that trips no rule on its own.
fn disciplined(id: &str, strategy: StrategyTag, entry_time: DateTime<Utc>) -> Trade {
    Trade::new(id, "BTCUSDT", Side::Buy, strategy, 0.5, 100.0, entry_time)
        .with_stop_loss(96.0)
        .with_account_equity(10_000.0)
        .with_pre_entry_move(0.01)
}

fn has_rule(violations: &[tradescore_core::ForbiddenRuleViolation], code: RuleCode) -> bool {
    violations.iter().any(|v| v.rule_code == code)
}

#[test]
fn scenario_a_volume_only_breakout_scores_eighteen() {
    let ind = Indicators {
        volume: Some(200.0),
        average_volume: Some(100.0),
        ..Indicators::default()
    };
    let result = engine().evaluate_strategy(StrategyTag::Breakout, &ind);
    assert!((result.total_score - 18.0).abs() < 1e-9);
    assert_eq!(result.criteria[0].ratio, 1.0);
    assert!(result.criteria[1..].iter().all(|c| c.ratio == 0.0));
}

#[test]
fn scenario_b_missing_stop_loss_costs_thirty() {
    let mut trade = disciplined("b", StrategyTag::Breakout, open_time());
    trade.stop_loss = None;

    let result = engine()
        .score_trade(&trade, &Indicators::default(), &[], &RuleParameters::default())
        .unwrap();
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].rule_code, RuleCode::NoStoploss);
    assert_eq!(result.forbidden_penalty, 30);
    assert_eq!(result.compliance_score, 10);
}

#[test]
fn scenario_c_revenge_window() {
    let engine = engine();
    let params = RuleParameters {
        revenge_trade_window: 30,
        ..RuleParameters::default()
    };
    let loss_exit = open_time();
    let loser = disciplined("loser", StrategyTag::Trend, loss_exit - Duration::hours(1))
        .closed_at(95.0, loss_exit);
    let history = vec![loser];

    let soon = disciplined("soon", StrategyTag::Trend, loss_exit + Duration::minutes(10));
    let violations = engine.detect_violations(&soon, &history, &params).unwrap();
    assert!(has_rule(&violations, RuleCode::RevengeTrade));
    let revenge = violations
        .iter()
        .find(|v| v.rule_code == RuleCode::RevengeTrade)
        .unwrap();
    assert_eq!(revenge.score_penalty, 15);

    let later = disciplined("later", StrategyTag::Trend, loss_exit + Duration::minutes(40));
    let violations = engine.detect_violations(&later, &history, &params).unwrap();
    assert!(!has_rule(&violations, RuleCode::RevengeTrade));
}

#[test]
fn scenario_d_perfect_clean_trade_scores_hundred() {
    let ind = Indicators {
        htf_trend: Some(TrendDirection::Up),
        pullback_ok: Some(true),
        trail_stop_correct: Some(true),
        ..Indicators::default()
    };
    let trade = disciplined("d", StrategyTag::Trend, open_time());
    let result = engine()
        .score_trade(&trade, &ind, &[], &RuleParameters::default())
        .unwrap();
    assert!(result.violations.is_empty());
    assert!((result.strategy_score - 60.0).abs() < 1e-9);
    assert!((result.final_score - 100.0).abs() < 1e-9);
    assert_eq!(result.grade, Grade::A);
}

#[test]
fn scenario_e_eleventh_trade_of_the_day_is_overtrading() {
    let engine = engine();
    let params = RuleParameters {
        max_daily_trades: 10,
        ..RuleParameters::default()
    };
    let day_start = Utc.with_ymd_and_hms(2024, 6, 3, 1, 0, 0).unwrap();
    // Closed winners, spaced apart, so only the daily count matters.
    let trades: Vec<Trade> = (0..11)
        .map(|i| {
            let entry = day_start + Duration::hours(i * 2);
            disciplined(&format!("t{i}"), StrategyTag::Breakout, entry)
                .closed_at(101.0, entry + Duration::minutes(30))
        })
        .collect();

    let tenth = &trades[9];
    let violations = engine.detect_violations(tenth, &trades[..9], &params).unwrap();
    assert!(!has_rule(&violations, RuleCode::Overtrading));

    let eleventh = &trades[10];
    let violations = engine.detect_violations(eleventh, &trades, &params).unwrap();
    assert!(has_rule(&violations, RuleCode::Overtrading));
    assert_eq!(violations.len(), 1);
}

#[test]
fn breakout_clearance_falls_back_to_entry_price() {
    // Entry 1% above the range high earns full clearance credit.
    let mut trade = disciplined("bo", StrategyTag::Breakout, open_time());
    trade.entry_price = 101.0;
    let ind = Indicators {
        prev_range_high: Some(100.0),
        ..Indicators::default()
    };
    let result = engine()
        .score_trade(&trade, &ind, &[], &RuleParameters::default())
        .unwrap();
    let validity = result
        .strategy
        .criterion(CriterionCode::BreakoutValidity)
        .unwrap();
    assert!((validity.score - 21.0).abs() < 1e-9);
    assert!((result.strategy_score - 21.0).abs() < 1e-9);
}

#[test]
fn careless_trade_bottoms_out_compliance() {
    let loss_exit = open_time() - Duration::minutes(5);
    let history = vec![
        disciplined("x", StrategyTag::CounterTrend, open_time() - Duration::hours(2))
            .closed_at(90.0, loss_exit),
    ];
    let trade = Trade::new(
        "y",
        "BTCUSDT",
        Side::Buy,
        StrategyTag::CounterTrend,
        50.0,
        100.0,
        open_time(),
    )
    .with_account_equity(10_000.0)
    .with_pre_entry_move(0.09);

    let result = engine()
        .score_trade(&trade, &Indicators::default(), &history, &RuleParameters::default())
        .unwrap();
    assert!(result.stats.raw_penalty > 40);
    assert_eq!(result.forbidden_penalty, 40);
    assert_eq!(result.compliance_score, 0);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.grade, Grade::F);
}

#[test]
fn result_serializes_to_json() {
    let trade = disciplined("j", StrategyTag::Trend, open_time());
    let result = engine()
        .score_trade(&trade, &Indicators::default(), &[], &RuleParameters::default())
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["grade"], "F");
    assert_eq!(json["compliance_score"], 40);
    assert_eq!(json["strategy"]["strategy"], "trend");
    assert!(json["catalog_fingerprint"].is_string());
}
