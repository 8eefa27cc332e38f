//! Config loading and validation.
//!
//! Every test targets a concrete failure mode:
//! - partial TOML must fill the rest from defaults
//! - invalid values must be rejected at load time, not mid-analysis
//! - enumerated strategies must parse from their snake_case names

use uplift_core::config::{RefutationConfig, UpliftConfig};
use uplift_core::errors::{ConfigError, UpliftErrorCode};
use uplift_core::types::{EstimatorStrategy, RefutationKind};

// ═══════════════════════════════════════════════════════════════════════════
// Defaults
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn empty_toml_yields_defaults() {
    let config = UpliftConfig::from_toml("").unwrap();
    assert_eq!(config, UpliftConfig::default());
    assert_eq!(config.analysis.treatment, "CampaignSpend");
    assert_eq!(config.analysis.outcome, "Conversions");
    assert_eq!(config.refutation.subset_fraction, 0.7);
    assert_eq!(config.refutation.checks, RefutationKind::ALL.to_vec());
    assert_eq!(config.counterfactual.multiplier, 1.2);
    assert_eq!(config.estimation.strategy, EstimatorStrategy::OrdinaryLeastSquares);
}

#[test]
fn partial_section_keeps_other_defaults() {
    let toml = r#"
        [refutation]
        seed = 42
    "#;
    let config = UpliftConfig::from_toml(toml).unwrap();
    assert_eq!(config.refutation.seed, 42);
    assert_eq!(config.refutation.subset_fraction, RefutationConfig::default().subset_fraction);
    assert!(config.refutation.parallel);
}

#[test]
fn full_config_parses() {
    let toml = r#"
        [analysis]
        treatment = "spend"
        outcome = "sales"
        group_by = "region"
        edges = ["season -> spend", "season -> sales", "spend -> sales"]

        [estimation]
        strategy = "ordinary_least_squares"
        confidence_level = 0.9

        [refutation]
        checks = ["placebo_treatment", "data_subset"]
        subset_fraction = 0.5
        parallel = false

        [counterfactual]
        multiplier = 1.5

        [observability]
        log_level = "debug"
        json = true
    "#;
    let config = UpliftConfig::from_toml(toml).unwrap();
    assert_eq!(config.analysis.edges.len(), 3);
    assert_eq!(config.analysis.group_by.as_deref(), Some("region"));
    assert_eq!(
        config.refutation.checks,
        vec![RefutationKind::PlaceboTreatment, RefutationKind::DataSubset]
    );
    assert!(!config.refutation.parallel);
    assert_eq!(config.counterfactual.multiplier, 1.5);
    assert!(config.observability.json);
}

// ═══════════════════════════════════════════════════════════════════════════
// Validation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn subset_fraction_out_of_range_is_rejected() {
    for bad in ["0.0", "1.5", "-0.2"] {
        let toml = format!("[refutation]\nsubset_fraction = {bad}\n");
        let err = UpliftConfig::from_toml(&toml).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field: "refutation.subset_fraction", .. }),
            "fraction {bad} should be rejected, got {err}"
        );
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}

#[test]
fn full_subset_fraction_is_allowed() {
    let config = UpliftConfig::from_toml("[refutation]\nsubset_fraction = 1.0\n").unwrap();
    assert_eq!(config.refutation.subset_fraction, 1.0);
}

#[test]
fn treatment_equal_to_outcome_is_rejected() {
    let toml = r#"
        [analysis]
        treatment = "x"
        outcome = "x"
    "#;
    assert!(UpliftConfig::from_toml(toml).is_err());
}

#[test]
fn grouping_by_treatment_is_rejected() {
    let toml = r#"
        [analysis]
        group_by = "CampaignSpend"
    "#;
    assert!(UpliftConfig::from_toml(toml).is_err());
}

#[test]
fn inverted_multiplier_range_is_rejected() {
    let toml = r#"
        [counterfactual]
        min_multiplier = 2.0
        max_multiplier = 0.5
    "#;
    assert!(UpliftConfig::from_toml(toml).is_err());
}

#[test]
fn infinite_multiplier_bound_is_rejected() {
    let toml = r#"
        [counterfactual]
        max_multiplier = inf
    "#;
    let err = UpliftConfig::from_toml(toml).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "counterfactual.max_multiplier",
            ..
        }
    ));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn unknown_strategy_fails_to_parse() {
    let toml = r#"
        [estimation]
        strategy = "random_forest"
    "#;
    let err = UpliftConfig::from_toml(toml).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn config_roundtrips_through_toml() {
    let mut config = UpliftConfig::default();
    config.refutation.seed = 7;
    config.analysis.group_by = None;
    let text = toml::to_string(&config).unwrap();
    let back = UpliftConfig::from_toml(&text).unwrap();
    assert_eq!(back, config);
}
