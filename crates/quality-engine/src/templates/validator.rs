//! Single entry point for deciding whether a template is complete and internally consistent.
//!
//! Each component stops at its first failure, but every component is checked, so one pass
//! reports all failing areas. Optional sub-configurations that were never filled in are valid
//! by absence.

use std::fmt::Display;

use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;

use super::aspect::AspectConfiguration;
use super::template::{QualityTemplate, TemplateParameters};

const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Tuning for the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorSettings {
    pub tolerance: f64,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl From<&EngineConfig> for ValidatorSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            tolerance: config.scale_tolerance,
        }
    }
}

/// Aggregated result: errors make a template invalid, warnings never do.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TemplateValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when some error was reported for `area`, e.g. `"screen sizes"`.
    pub fn has_error_in(&self, area: &str) -> bool {
        let prefix = format!("{area}: ");
        self.errors.iter().any(|error| error.starts_with(&prefix))
    }

    fn error(&mut self, area: &str, message: impl Display) {
        self.errors.push(format!("{area}: {message}"));
    }

    fn warning(&mut self, area: &str, message: impl Display) {
        self.warnings.push(format!("{area}: {message}"));
    }

    fn check<E: Display>(&mut self, area: &str, result: Result<(), E>) {
        if let Err(error) = result {
            self.error(area, error);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateValidator {
    settings: ValidatorSettings,
}

impl TemplateValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    pub fn validate(&self, template: &QualityTemplate) -> TemplateValidation {
        let mut outcome = TemplateValidation::default();

        if !template.has_name() {
            outcome.error("name", "template needs a non-empty name");
        }
        if template.origin.trim().is_empty() {
            outcome.error("origin", "template needs a non-empty origin");
        }
        if template.version < 1 {
            outcome.error("version", "version must be at least 1");
        }
        outcome.check("sharing", template.sharing.validate());

        self.check_parameters(&template.parameters, &mut outcome);

        debug!(
            template_id = %template.id,
            version = template.version,
            errors = outcome.errors.len(),
            warnings = outcome.warnings.len(),
            "validated quality template"
        );
        outcome
    }

    /// Validate a bare parameter payload, without the identity fields of a template.
    pub fn validate_parameters(&self, parameters: &TemplateParameters) -> TemplateValidation {
        let mut outcome = TemplateValidation::default();
        self.check_parameters(parameters, &mut outcome);
        outcome
    }

    fn check_parameters(&self, parameters: &TemplateParameters, outcome: &mut TemplateValidation) {
        let tolerance = self.settings.tolerance;

        check_positive(
            outcome,
            "sample size",
            "sample_size_grams",
            parameters.sample_size_grams,
        );
        check_positive(
            outcome,
            "roast sample size",
            "roast_sample_size_grams",
            parameters.roast_sample_size_grams,
        );
        check_moisture(outcome, parameters.moisture_min, parameters.moisture_max);

        if parameters.screen_size_requirements.is_empty() {
            outcome.error(
                "screen sizes",
                "at least one screen size constraint is required",
            );
        } else {
            outcome.check(
                "screen sizes",
                parameters.screen_size_requirements.validate(),
            );
        }

        check_aspect(
            outcome,
            "green aspect",
            parameters.green_aspect_configuration.as_ref(),
        );
        check_aspect(
            outcome,
            "roast aspect",
            parameters.roast_aspect_configuration.as_ref(),
        );

        if let Some(defects) = parameters
            .defect_configuration
            .as_ref()
            .filter(|config| !config.is_empty())
        {
            match defects.validate() {
                Ok(report) => {
                    for warning in report.warnings {
                        outcome.warning("defects", warning);
                    }
                }
                Err(error) => outcome.error("defects", error),
            }
        }

        if let Some(taint_fault) = parameters
            .taint_fault_configuration
            .as_ref()
            .filter(|config| !config.is_empty())
        {
            outcome.check("taints and faults", taint_fault.validate());
        }

        let cupping = &parameters.cupping_attributes;
        if cupping.is_empty() {
            outcome.error("cupping", "at least one cupping attribute is required");
        } else {
            outcome.check("cupping", cupping.validate(tolerance));
            if cupping.required_attributes().next().is_none() {
                outcome.warning("cupping", "no cupping attribute is marked as required");
            }
        }

        if let Some(micro_regions) = parameters
            .micro_region_configuration
            .as_ref()
            .filter(|config| !config.is_empty())
        {
            outcome.check("micro regions", micro_regions.validate());
        }
    }
}

/// Validate with default settings.
pub fn validate_template(template: &QualityTemplate) -> TemplateValidation {
    TemplateValidator::default().validate(template)
}

fn check_positive(outcome: &mut TemplateValidation, area: &str, field: &str, value: Option<f64>) {
    if let Some(value) = value {
        if !value.is_finite() || value <= 0.0 {
            outcome.error(area, format!("{field} must be positive (found {value})"));
        }
    }
}

fn check_moisture(outcome: &mut TemplateValidation, min: Option<f64>, max: Option<f64>) {
    for (field, value) in [("moisture_min", min), ("moisture_max", max)] {
        if let Some(value) = value {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                outcome.error(
                    "moisture",
                    format!("{field} must be between 0 and 100 (found {value})"),
                );
                return;
            }
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            outcome.error(
                "moisture",
                format!("moisture_min {min} exceeds moisture_max {max}"),
            );
        }
    }
}

fn check_aspect(
    outcome: &mut TemplateValidation,
    area: &str,
    config: Option<&AspectConfiguration>,
) {
    if let Some(config) = config.filter(|config| !config.is_empty()) {
        outcome.check(area, config.validate());
    }
}
