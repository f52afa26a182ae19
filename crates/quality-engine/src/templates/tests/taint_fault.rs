use super::common::*;
use crate::templates::scale::{Scale, ScaleError, WordingOption};
use crate::templates::taint_fault::{
    calculate_taint_fault_stats, TaintFaultConfiguration, TaintFaultDefinition, TaintFaultError,
    TaintFaultKind, TaintFaultValidationRules,
};

#[test]
fn enabling_zero_tolerance_clears_limits() {
    let mut config = taint_faults();

    config.set_zero_tolerance(true);

    assert_eq!(config.rules, TaintFaultValidationRules::zero_tolerance());
    assert_eq!(config.rules.max_taints, None);
    assert_eq!(config.rules.max_faults, None);
    assert_eq!(
        serde_json::to_value(&config.rules).expect("serialize"),
        serde_json::json!({ "zero_tolerance": true })
    );
}

#[test]
fn disabling_zero_tolerance_starts_from_empty_rules() {
    let mut config = taint_faults();
    config.set_zero_tolerance(true);

    config.set_zero_tolerance(false);

    assert_eq!(config.rules, TaintFaultValidationRules::default());
    assert!(!config.rules.is_active());
}

#[test]
fn stats_count_definitions_and_rules() {
    let config = taint_faults();

    let stats = calculate_taint_fault_stats(&config);

    assert_eq!(stats.taint_count, 1);
    assert_eq!(stats.fault_count, 1);
    assert_eq!(stats.total_definitions, 2);
    assert!(stats.has_active_rules);

    let empty = calculate_taint_fault_stats(&TaintFaultConfiguration::default());
    assert_eq!(empty.total_definitions, 0);
    assert!(!empty.has_active_rules);
}

#[test]
fn names_are_unique_per_kind_only() {
    let mut config = taint_faults();

    config
        .add_fault(TaintFaultDefinition::new(
            "Earthy",
            Scale::numeric(0.0, 5.0, 1.0),
        ))
        .expect("faults are a separate list");
    match config.add_taint(TaintFaultDefinition::new(
        "earthy",
        Scale::numeric(0.0, 3.0, 1.0),
    )) {
        Err(TaintFaultError::DuplicateName { kind, .. }) => assert_eq!(kind, TaintFaultKind::Taint),
        other => panic!("expected duplicate taint, got {other:?}"),
    }
}

#[test]
fn definitions_need_a_valid_scale() {
    let mut config = TaintFaultConfiguration::default();

    match config.add_taint(TaintFaultDefinition::new(
        "Musty",
        Scale::numeric(3.0, 0.0, 1.0),
    )) {
        Err(TaintFaultError::InvalidScale { name, source, .. }) => {
            assert_eq!(name, "Musty");
            assert_eq!(source, ScaleError::MinNotBelowMax { min: 3.0, max: 0.0 });
        }
        other => panic!("expected invalid scale, got {other:?}"),
    }

    match config.add_fault(TaintFaultDefinition::new("Moldy", Scale::wording(Vec::new()))) {
        Err(TaintFaultError::InvalidScale { source, .. }) => {
            assert_eq!(source, ScaleError::NoOptions)
        }
        other => panic!("expected invalid scale, got {other:?}"),
    }
    assert!(config.is_empty());
}

#[test]
fn removal_and_moves_keep_order_contiguous() {
    let mut config = taint_faults();
    let musty = config
        .add_taint(TaintFaultDefinition::new(
            "Musty",
            Scale::wording(vec![
                WordingOption::new("Slight", 1.0),
                WordingOption::new("Strong", 2.0),
            ]),
        ))
        .expect("second taint");
    let earthy = config.taints[0].id;

    assert_eq!(config.move_up(TaintFaultKind::Taint, musty), Ok(true));
    assert_eq!(config.taints[0].name, "Musty");

    config
        .remove(TaintFaultKind::Taint, musty)
        .expect("musty exists");
    assert_eq!(config.taints[0].id, earthy);
    assert_eq!(config.taints[0].display_order, 0);
    assert!(config.validate().is_ok());

    match config.move_down(TaintFaultKind::Fault, earthy) {
        Err(TaintFaultError::NotFound { kind, .. }) => assert_eq!(kind, TaintFaultKind::Fault),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn negative_intensity_cap_is_rejected_unless_zero_tolerance() {
    let mut config = taint_faults();
    config.rules.max_fault_intensity = Some(-1.0);

    match config.validate() {
        Err(TaintFaultError::InvalidIntensityCap { field, .. }) => {
            assert_eq!(field, "max_fault_intensity")
        }
        other => panic!("expected invalid intensity cap, got {other:?}"),
    }

    config.rules.zero_tolerance = Some(true);
    assert!(config.validate().is_ok());
}
