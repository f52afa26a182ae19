use super::common::TOLERANCE;
use crate::templates::cupping::CuppingConfiguration;
use crate::templates::presets::{self, PresetKind};
use crate::templates::scale::ValidationRule;

#[test]
fn every_catalogued_preset_builds_and_validates() {
    for info in presets::catalogue() {
        let valid = match info.kind {
            PresetKind::Defects => {
                presets::defect_preset(info.key).map(|preset| preset.validate().is_ok())
            }
            PresetKind::TaintFault => {
                presets::taint_fault_preset(info.key).map(|preset| preset.validate().is_ok())
            }
            PresetKind::GreenAspect | PresetKind::RoastAspect => {
                presets::aspect_preset(info.key).map(|preset| preset.validate().is_ok())
            }
            PresetKind::Cupping => presets::cupping_template(info.key).map(|template| {
                CuppingConfiguration::new(template.attributes)
                    .validate(TOLERANCE)
                    .is_ok()
            }),
        };
        assert_eq!(valid, Some(true), "preset {} ({:?})", info.key, info.kind);
    }
}

#[test]
fn unknown_keys_yield_nothing() {
    assert!(presets::defect_preset("arabica_gold").is_none());
    assert!(presets::taint_fault_preset("lenient").is_none());
    assert!(presets::aspect_preset("blue").is_none());
    assert!(presets::cupping_template("geisha").is_none());
}

#[test]
fn kinds_parse_from_cli_spellings() {
    assert_eq!(PresetKind::parse("taint_fault"), Some(PresetKind::TaintFault));
    assert_eq!(PresetKind::parse(" Green-Aspect "), Some(PresetKind::GreenAspect));
    assert_eq!(PresetKind::parse("cupping"), Some(PresetKind::Cupping));
    assert_eq!(PresetKind::parse("moisture"), None);
    assert_eq!(presets::presets_of(PresetKind::Cupping).count(), 3);

    for info in presets::catalogue() {
        assert_eq!(PresetKind::parse(info.kind.label()), Some(info.kind));
    }
}

#[test]
fn presets_are_fresh_copies() {
    let first = presets::aspect_preset("green_standard").expect("known preset");
    let second = presets::aspect_preset("green_standard").expect("known preset");

    assert_ne!(first.wordings[0].id, second.wordings[0].id);
    assert_eq!(
        first.validation.as_ref().map(|rule| rule.min_acceptable_value),
        Some(6.0)
    );
}

#[test]
fn specialty_protocol_requires_overall_of_seven() {
    let protocol = presets::cupping_template("specialty").expect("known protocol");

    let overall = protocol
        .attributes
        .iter()
        .find(|attribute| attribute.attribute == "Overall")
        .expect("overall attribute");

    assert_eq!(
        overall.validation_rule,
        Some(ValidationRule::Minimum { value: 7.0 })
    );
    assert_eq!(overall.rule_text().as_deref(), Some("≥7.0"));
}

#[test]
fn zero_tolerance_preset_carries_only_the_flag() {
    let preset = presets::taint_fault_preset("zero_tolerance").expect("known preset");

    assert!(preset.rules.is_zero_tolerance());
    assert_eq!(preset.rules.max_taints, None);
    assert_eq!(preset.taints.len(), 4);
    assert_eq!(preset.faults.len(), 4);
}
