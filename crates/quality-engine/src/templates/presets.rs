//! Read-only reference catalogues. Every lookup builds a fresh owned value, so loading a preset
//! into a configuration always replaces it wholesale.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::aspect::{AspectConfiguration, AspectValidation, AspectWording};
use super::cupping::{CuppingAttribute, CuppingAttributeTemplate};
use super::defects::{DefectCategory, DefectConfiguration, DefectDefinition, DefectThresholds};
use super::scale::{Scale, ValidationRule, WordingOption};
use super::taint_fault::{
    TaintFaultConfiguration, TaintFaultDefinition, TaintFaultValidationRules,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    Defects,
    TaintFault,
    GreenAspect,
    RoastAspect,
    Cupping,
}

impl PresetKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Defects => "defects",
            Self::TaintFault => "taint-fault",
            Self::GreenAspect => "green-aspect",
            Self::RoastAspect => "roast-aspect",
            Self::Cupping => "cupping",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "defects" | "defect" => Some(Self::Defects),
            "taint-fault" | "taints" | "faults" => Some(Self::TaintFault),
            "green-aspect" | "green" => Some(Self::GreenAspect),
            "roast-aspect" | "roast" => Some(Self::RoastAspect),
            "cupping" => Some(Self::Cupping),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetInfo {
    pub kind: PresetKind,
    pub key: &'static str,
    pub name: &'static str,
}

const CATALOGUE: &[PresetInfo] = &[
    PresetInfo {
        kind: PresetKind::Defects,
        key: "specialty_full_defects",
        name: "Specialty green grading, full defect equivalents",
    },
    PresetInfo {
        kind: PresetKind::Defects,
        key: "brazil_cob",
        name: "Brazilian official classification (COB) defect table",
    },
    PresetInfo {
        kind: PresetKind::TaintFault,
        key: "specialty_cupping",
        name: "Cupping taints and faults with count limits",
    },
    PresetInfo {
        kind: PresetKind::TaintFault,
        key: "zero_tolerance",
        name: "Cupping taints and faults, zero tolerance",
    },
    PresetInfo {
        kind: PresetKind::GreenAspect,
        key: "green_standard",
        name: "Green bean colour and appearance",
    },
    PresetInfo {
        kind: PresetKind::RoastAspect,
        key: "roast_standard",
        name: "Roasted bean evenness",
    },
    PresetInfo {
        kind: PresetKind::Cupping,
        key: "specialty",
        name: "Specialty arabica cupping protocol",
    },
    PresetInfo {
        kind: PresetKind::Cupping,
        key: "brazil_cob",
        name: "Brazilian beverage classification",
    },
    PresetInfo {
        kind: PresetKind::Cupping,
        key: "fine_robusta",
        name: "Fine robusta cupping protocol",
    },
];

pub fn catalogue() -> &'static [PresetInfo] {
    CATALOGUE
}

pub fn presets_of(kind: PresetKind) -> impl Iterator<Item = &'static PresetInfo> {
    CATALOGUE.iter().filter(move |info| info.kind == kind)
}

pub fn defect_preset(key: &str) -> Option<DefectConfiguration> {
    let preset = match key {
        "specialty_full_defects" => DefectConfiguration {
            defects: catalogue_defects(&[
                ("Full Black", DefectCategory::Primary, 1.0),
                ("Full Sour", DefectCategory::Primary, 1.0),
                ("Dried Cherry/Pod", DefectCategory::Primary, 1.0),
                ("Fungus Damaged", DefectCategory::Primary, 1.0),
                ("Foreign Matter", DefectCategory::Primary, 1.0),
                ("Severe Insect Damage", DefectCategory::Primary, 0.2),
                ("Partial Black", DefectCategory::Secondary, 1.0 / 3.0),
                ("Partial Sour", DefectCategory::Secondary, 1.0 / 3.0),
                ("Parchment", DefectCategory::Secondary, 0.2),
                ("Floater", DefectCategory::Secondary, 0.2),
                ("Immature/Unripe", DefectCategory::Secondary, 0.2),
                ("Withered", DefectCategory::Secondary, 0.2),
                ("Shell", DefectCategory::Secondary, 0.2),
                ("Broken/Chipped/Cut", DefectCategory::Secondary, 0.2),
                ("Hull/Husk", DefectCategory::Secondary, 0.2),
                ("Slight Insect Damage", DefectCategory::Secondary, 0.1),
            ]),
            thresholds: DefectThresholds {
                max_primary: Some(0),
                max_secondary: None,
                max_total: Some(5),
            },
        },
        "brazil_cob" => DefectConfiguration {
            defects: catalogue_defects(&[
                ("Black", DefectCategory::Primary, 1.0),
                ("Dried Cherry", DefectCategory::Primary, 1.0),
                ("Large Stone", DefectCategory::Primary, 5.0),
                ("Large Husk", DefectCategory::Primary, 1.0),
                ("Sour", DefectCategory::Secondary, 0.5),
                ("Parchment", DefectCategory::Secondary, 0.5),
                ("Immature", DefectCategory::Secondary, 0.2),
                ("Shell", DefectCategory::Secondary, 1.0 / 3.0),
                ("Broken", DefectCategory::Secondary, 0.2),
                ("Insect Damaged", DefectCategory::Secondary, 0.2),
            ]),
            thresholds: DefectThresholds {
                max_primary: None,
                max_secondary: None,
                max_total: Some(86),
            },
        },
        _ => return None,
    };
    debug!(key, "built defect preset");
    Some(preset)
}

pub fn taint_fault_preset(key: &str) -> Option<TaintFaultConfiguration> {
    let rules = match key {
        "specialty_cupping" => TaintFaultValidationRules {
            max_taints: Some(2),
            max_faults: Some(0),
            max_taint_intensity: Some(2.0),
            validation_message: Some("Sample shows more off-flavours than allowed".to_string()),
            ..TaintFaultValidationRules::default()
        },
        "zero_tolerance" => TaintFaultValidationRules::zero_tolerance(),
        _ => return None,
    };

    let intensity = || {
        Scale::wording(vec![
            WordingOption::new("Slight", 1.0),
            WordingOption::new("Moderate", 2.0),
            WordingOption::new("Strong", 3.0),
        ])
    };
    let fault_intensity = || Scale::numeric(0.0, 5.0, 1.0);

    let taints = numbered(
        [
            ("Earthy", "Soil-like, damp cellar notes"),
            ("Musty", "Stale, closed-room aroma"),
            ("Fermented", "Overripe fruit, vinegar edge"),
            ("Phenolic", "Medicinal, iodine-like"),
        ]
        .into_iter()
        .map(|(name, description)| {
            TaintFaultDefinition::new(name, intensity()).with_description(description)
        })
        .collect(),
    );
    let faults = numbered(
        [
            ("Rioy", "Heavy iodine and chemical character"),
            ("Potato", "Raw potato from insect damage"),
            ("Moldy", "Mould growth on green coffee"),
            ("Sour", "Acetic, rotten fruit"),
        ]
        .into_iter()
        .map(|(name, description)| {
            TaintFaultDefinition::new(name, fault_intensity()).with_description(description)
        })
        .collect(),
    );

    debug!(key, "built taint/fault preset");
    Some(TaintFaultConfiguration {
        taints,
        faults,
        rules,
        notes: None,
    })
}

const GREEN_ASPECT: &[(&str, f64, &str)] = &[
    ("Discoloured", 2.0, "Whitish or yellowed beans"),
    ("Faded", 4.0, "Colour loss from age or poor storage"),
    ("Greenish", 6.0, "Even green with minor variation"),
    ("Fine", 8.0, "Uniform green"),
    ("Blue-Green", 10.0, "Fresh, uniform blue-green"),
];

const ROAST_ASPECT: &[(&str, f64, &str)] = &[
    ("Irregular", 3.0, "Many quakers or scorched beans"),
    ("Uneven", 5.0, "Visible colour spread"),
    ("Good", 7.0, "Minor colour spread"),
    ("Very Good", 9.0, "Even colour, no quakers"),
];

pub fn aspect_preset(key: &str) -> Option<AspectConfiguration> {
    let (entries, validation) = match key {
        "green_standard" => (GREEN_ASPECT, Some(6.0)),
        "roast_standard" => (ROAST_ASPECT, None),
        _ => return None,
    };

    let wordings = entries
        .iter()
        .enumerate()
        .map(|(position, (label, value, description))| AspectWording {
            id: Uuid::new_v4(),
            label: (*label).to_string(),
            value: *value,
            display_order: position as u32,
            description: Some((*description).to_string()),
        })
        .collect();

    debug!(key, "built aspect preset");
    Some(AspectConfiguration {
        wordings,
        validation: validation.map(|min_acceptable_value| AspectValidation {
            min_acceptable_value,
            validation_message: None,
        }),
        notes: None,
    })
}

pub fn cupping_template(key: &str) -> Option<CuppingAttributeTemplate> {
    cupping_templates()
        .into_iter()
        .find(|template| template.key == key)
}

pub fn cupping_templates() -> Vec<CuppingAttributeTemplate> {
    let quarter_points = || Scale::numeric(6.0, 10.0, 0.25);
    let cup_points = || Scale::numeric(0.0, 10.0, 2.0);
    let scored = |name: &str| CuppingAttribute::new(name, quarter_points()).required();

    vec![
        CuppingAttributeTemplate {
            key: "specialty",
            name: "Specialty arabica cupping protocol",
            attributes: vec![
                scored("Fragrance/Aroma"),
                scored("Flavor"),
                scored("Aftertaste"),
                scored("Acidity"),
                scored("Body"),
                scored("Balance"),
                CuppingAttribute::new("Uniformity", cup_points()).required(),
                CuppingAttribute::new("Clean Cup", cup_points()).required(),
                CuppingAttribute::new("Sweetness", cup_points()).required(),
                scored("Overall").with_rule(ValidationRule::Minimum { value: 7.0 }),
            ],
        },
        CuppingAttributeTemplate {
            key: "brazil_cob",
            name: "Brazilian beverage classification",
            attributes: vec![
                CuppingAttribute::new(
                    "Beverage",
                    Scale::wording(vec![
                        WordingOption::new("Rio Zona", 1.0),
                        WordingOption::new("Rio", 2.0),
                        WordingOption::new("Riada", 3.0),
                        WordingOption::new("Hard", 4.0),
                        WordingOption::new("Softish", 5.0),
                        WordingOption::new("Soft", 6.0),
                        WordingOption::new("Strictly Soft", 7.0),
                    ]),
                )
                .required()
                .with_rule(ValidationRule::Minimum { value: 4.0 }),
                CuppingAttribute::new(
                    "Body",
                    Scale::wording(vec![
                        WordingOption::new("Light", 1.0),
                        WordingOption::new("Medium", 2.0),
                        WordingOption::new("Full", 3.0),
                    ]),
                ),
            ],
        },
        CuppingAttributeTemplate {
            key: "fine_robusta",
            name: "Fine robusta cupping protocol",
            attributes: vec![
                scored("Fragrance/Aroma"),
                scored("Flavor"),
                scored("Aftertaste"),
                scored("Salt/Acid"),
                scored("Bitter/Sweet"),
                scored("Mouthfeel"),
                scored("Balance"),
                CuppingAttribute::new("Uniform Cups", cup_points()).required(),
                CuppingAttribute::new("Clean Cups", cup_points()).required(),
                scored("Overall"),
            ],
        },
    ]
}

fn catalogue_defects(entries: &[(&str, DefectCategory, f64)]) -> Vec<DefectDefinition> {
    let mut primary = 0;
    let mut secondary = 0;
    entries
        .iter()
        .map(|(name, category, weight)| {
            let counter = match category {
                DefectCategory::Primary => &mut primary,
                DefectCategory::Secondary => &mut secondary,
            };
            let display_order = *counter;
            *counter += 1;
            DefectDefinition {
                name: (*name).to_string(),
                category: *category,
                weight: *weight,
                display_order,
            }
        })
        .collect()
}

fn numbered(mut definitions: Vec<TaintFaultDefinition>) -> Vec<TaintFaultDefinition> {
    super::ordering::renumber(&mut definitions);
    definitions
}
