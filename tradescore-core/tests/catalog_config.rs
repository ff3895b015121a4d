//! Catalog loading from TOML files on disk.

use std::io::Write;

use chrono::{TimeZone, Utc};
use tradescore_core::{
    Catalog, CatalogConfig, CatalogError, Indicators, RuleCode, ScoringEngine, Severity, Side,
    StrategyTag, Trade, TrendDirection,
};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn overrides_load_from_file() {
    let file = write_config(
        r#"
        [strategies.trend]
        htf_alignment = 0.5
        pullback_entry = 0.25
        trail_stop_quality = 0.25

        [rules.no_stoploss]
        penalty = 20
        severity = "medium"

        [rules.chasing]
        enabled = false

        [params]
        max_daily_trades = 3
        "#,
    );
    let catalog = Catalog::from_file(file.path()).unwrap();

    let trend = catalog.criteria(StrategyTag::Trend);
    assert_eq!(trend[0].weight, 0.5);
    assert!((trend[0].max_points() - 30.0).abs() < 1e-9);

    let stop = catalog.rule(RuleCode::NoStoploss).unwrap();
    assert_eq!(stop.score_penalty, 20);
    assert_eq!(stop.severity, Severity::Medium);
    assert!(!catalog.rule(RuleCode::Chasing).unwrap().enabled);
    assert_eq!(catalog.params().max_daily_trades, 3);

    // Untouched sections keep the built-in values.
    assert_eq!(catalog.criteria(StrategyTag::Breakout).len(), 3);
    assert_eq!(catalog.rule(RuleCode::OversizedPosition).unwrap().score_penalty, 25);
}

#[test]
fn overridden_catalog_changes_scores() {
    let file = write_config(
        r#"
        [strategies.trend]
        htf_alignment = 0.5
        pullback_entry = 0.25
        trail_stop_quality = 0.25

        [rules.no_stoploss]
        penalty = 20
        "#,
    );
    let engine = ScoringEngine::new(Catalog::from_file(file.path()).unwrap());
    let trade = Trade::new(
        "cfg",
        "ETHUSDT",
        Side::Sell,
        StrategyTag::Trend,
        1.0,
        100.0,
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
    );
    let ind = Indicators {
        htf_trend: Some(TrendDirection::Down),
        ..Indicators::default()
    };
    let result = engine.score_request(&tradescore_core::ScoreRequest {
        trade,
        indicators: ind,
        history: Vec::new(),
        params: None,
    })
    .unwrap();
    assert!((result.strategy_score - 30.0).abs() < 1e-9);
    assert_eq!(result.forbidden_penalty, 20);
    assert!((result.final_score - 50.0).abs() < 1e-9);
}

#[test]
fn weight_sum_defect_is_rejected_at_load() {
    let file = write_config(
        r#"
        [strategies.breakout]
        volume_confirmed = 0.5
        breakout_validity = 0.35
        pullback_control = 0.35
        "#,
    );
    let err = Catalog::from_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::WeightSum {
            strategy: StrategyTag::Breakout,
            ..
        }
    ));
}

#[test]
fn unknown_codes_are_rejected_at_load() {
    let bad_rule = write_config("[rules.fomo]\npenalty = 5");
    assert!(matches!(
        Catalog::from_file(bad_rule.path()).unwrap_err(),
        CatalogError::UnknownRule(_)
    ));

    let bad_criterion = write_config("[strategies.trend]\nhtf_alignment = 0.5\nmoon_phase = 0.5");
    assert!(matches!(
        Catalog::from_file(bad_criterion.path()).unwrap_err(),
        CatalogError::UnknownCriterion(_)
    ));

    let misplaced = write_config("[strategies.trend]\nhtf_alignment = 0.5\ntight_rr = 0.5");
    assert!(matches!(
        Catalog::from_file(misplaced.path()).unwrap_err(),
        CatalogError::CriterionStrategyMismatch { .. }
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Catalog::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
}

#[test]
fn fingerprint_tracks_effective_config() {
    let builtin = Catalog::builtin().unwrap();

    // Writing the built-in catalog out in full reproduces its fingerprint.
    let full = write_config(&CatalogConfig::builtin().to_toml().unwrap());
    let reloaded = Catalog::from_file(full.path()).unwrap();
    assert_eq!(reloaded.fingerprint(), builtin.fingerprint());

    let tweaked = write_config("[params]\nchasing_threshold = 0.08");
    let changed = Catalog::from_file(tweaked.path()).unwrap();
    assert_ne!(changed.fingerprint(), builtin.fingerprint());
    assert_eq!(builtin.fingerprint().len(), 64);
}
