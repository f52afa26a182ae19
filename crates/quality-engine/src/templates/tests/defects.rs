use super::common::*;
use crate::templates::defects::{DefectCategory, DefectConfiguration, DefectError, DefectThresholds};
use crate::templates::presets;

#[test]
fn thresholds_do_not_depend_on_defect_count() {
    let config = defects();

    let report = config.validate().expect("structurally valid");

    assert!(report.warnings.is_empty());
    assert_eq!(config.total_weight(DefectCategory::Primary), 2.0);
}

#[test]
fn display_order_is_per_category() {
    let config = defects();

    let primary: Vec<u32> = config
        .defects_in(DefectCategory::Primary)
        .map(|defect| defect.display_order)
        .collect();
    let secondary: Vec<u32> = config
        .defects_in(DefectCategory::Secondary)
        .map(|defect| defect.display_order)
        .collect();

    assert_eq!(primary, vec![0, 1]);
    assert_eq!(secondary, vec![0]);
}

#[test]
fn moving_stays_inside_the_category() {
    let mut config = defects();

    assert_eq!(
        config.move_defect_up(DefectCategory::Primary, "Full Sour"),
        Ok(true)
    );
    assert_eq!(
        config.move_defect_up(DefectCategory::Secondary, "Broken"),
        Ok(false)
    );

    let names: Vec<&str> = config
        .defects_in(DefectCategory::Primary)
        .map(|defect| defect.name.as_str())
        .collect();
    assert_eq!(names, vec!["Full Sour", "Full Black"]);
    assert!(config.validate().is_ok());
}

#[test]
fn removal_renumbers_only_its_category() {
    let mut config = defects();
    config
        .add_defect("Shell", DefectCategory::Secondary, 0.2)
        .expect("new secondary");

    config
        .remove_defect(DefectCategory::Primary, "full black")
        .expect("case-insensitive lookup");

    let full_sour = config
        .defects_in(DefectCategory::Primary)
        .next()
        .expect("one primary left");
    assert_eq!(full_sour.display_order, 0);
    let shell = config
        .defects_in(DefectCategory::Secondary)
        .find(|defect| defect.name == "Shell")
        .expect("shell kept");
    assert_eq!(shell.display_order, 1);
}

#[test]
fn zero_weight_is_rejected() {
    let mut config = defects();

    match config.add_defect("Stone", DefectCategory::Primary, 0.0) {
        Err(DefectError::NonPositiveWeight { name, weight }) => {
            assert_eq!(name, "Stone");
            assert_eq!(weight, 0.0);
        }
        other => panic!("expected non-positive weight, got {other:?}"),
    }

    config.defects[0].weight = -1.0;
    match config.validate() {
        Err(DefectError::NonPositiveWeight { .. }) => {}
        other => panic!("expected non-positive weight, got {other:?}"),
    }
}

#[test]
fn same_name_is_allowed_across_categories() {
    let mut config = defects();

    config
        .add_defect("Full Black", DefectCategory::Secondary, 0.5)
        .expect("other category");
    match config.add_defect("FULL BLACK", DefectCategory::Primary, 1.0) {
        Err(DefectError::DuplicateName { category, .. }) => {
            assert_eq!(category, DefectCategory::Primary)
        }
        other => panic!("expected duplicate name, got {other:?}"),
    }
}

#[test]
fn strict_total_only_warns() {
    let mut config = defects();
    config.set_thresholds(DefectThresholds {
        max_primary: Some(8),
        max_secondary: Some(3),
        max_total: Some(5),
    });

    let report = config.validate().expect("warnings never invalidate");

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("max_primary 8"));
}

#[test]
fn preset_replaces_configuration_wholesale() {
    let mut config = defects();
    let preset = presets::defect_preset("brazil_cob").expect("known preset");

    config.load_preset(preset.clone());

    assert_eq!(config, preset);
    assert!(config
        .defects_in(DefectCategory::Primary)
        .all(|defect| defect.name != "Full Sour"));
    assert_eq!(config.thresholds.max_total, Some(86));
}

#[test]
fn unknown_defect_is_not_found() {
    let mut config = DefectConfiguration::default();

    match config.update_weight(DefectCategory::Secondary, "Quaker", 0.2) {
        Err(DefectError::NotFound { name, .. }) => assert_eq!(name, "Quaker"),
        other => panic!("expected not found, got {other:?}"),
    }
}
