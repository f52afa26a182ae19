//! Quality template data model, component validators, presets, and the template validator.

pub mod aspect;
pub mod cupping;
pub mod defects;
pub mod import;
pub mod micro_region;
pub mod ordering;
pub mod presets;
pub mod scale;
pub mod screen_size;
pub mod service;
pub mod taint_fault;
pub mod template;
pub mod validator;

#[cfg(test)]
mod tests;

pub use aspect::{AspectConfiguration, AspectError, AspectValidation, AspectWording};
pub use cupping::{CuppingAttribute, CuppingAttributeTemplate, CuppingConfiguration, CuppingError};
pub use defects::{
    DefectCategory, DefectConfiguration, DefectDefinition, DefectError, DefectReport,
    DefectThresholds,
};
pub use import::CatalogueImportError;
pub use micro_region::{
    MicroRegionConfiguration, MicroRegionError, MicroRegionRequirement, PercentageBounds,
};
pub use presets::{PresetInfo, PresetKind};
pub use scale::{
    format_validation_rule, validate_scale, NumericScale, RuleError, Scale, ScaleError,
    ValidationRule, WordingOption, WordingScale,
};
pub use screen_size::{
    ConstraintType, ScreenSizeConstraint, ScreenSizeError, ScreenSizeRequirements,
};
pub use service::{
    SavedTemplate, StoreError, TemplateService, TemplateServiceError, TemplateStore,
    VersionHistory,
};
pub use taint_fault::{
    calculate_taint_fault_stats, TaintFaultConfiguration, TaintFaultDefinition, TaintFaultError,
    TaintFaultKind, TaintFaultStats, TaintFaultValidationRules,
};
pub use template::{
    LaboratoryId, QualityTemplate, SharingScope, SharingScopeError, TemplateParameters,
    TemplateRevision,
};
pub use validator::{validate_template, TemplateValidation, TemplateValidator, ValidatorSettings};
