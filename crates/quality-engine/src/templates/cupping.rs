//! Sensory cupping attributes and reusable cupping protocols.

use serde::{Deserialize, Serialize};

use super::ordering::normalized_key;
use super::scale::{format_validation_rule, RuleError, Scale, ScaleError, ValidationRule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuppingAttribute {
    pub attribute: String,
    pub scale: Scale,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<ValidationRule>,
}

impl CuppingAttribute {
    pub fn new(attribute: impl Into<String>, scale: Scale) -> Self {
        Self {
            attribute: attribute.into(),
            scale,
            is_required: false,
            validation_rule: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rule = Some(rule);
        self
    }

    /// Rendered rule, e.g. `≥7.0`, when one is attached.
    pub fn rule_text(&self) -> Option<String> {
        self.validation_rule
            .as_ref()
            .map(|rule| format_validation_rule(rule, &self.scale))
    }

    pub fn validate(&self, tolerance: f64) -> Result<(), CuppingError> {
        if self.attribute.trim().is_empty() {
            return Err(CuppingError::EmptyName);
        }
        self.scale
            .validate()
            .map_err(|source| CuppingError::InvalidScale {
                attribute: self.attribute.clone(),
                source,
            })?;
        if let Some(rule) = &self.validation_rule {
            self.scale
                .check_rule(rule, tolerance)
                .map_err(|source| CuppingError::InvalidRule {
                    attribute: self.attribute.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

/// Named, immutable preset list of attributes such as a regional cupping protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CuppingAttributeTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub attributes: Vec<CuppingAttribute>,
}

/// Attribute list of one quality template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CuppingConfiguration {
    pub attributes: Vec<CuppingAttribute>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CuppingError {
    #[error("cupping attribute name must not be empty")]
    EmptyName,
    #[error("cupping attribute '{0}' is listed more than once")]
    DuplicateAttribute(String),
    #[error("cupping attribute '{attribute}' has an invalid scale: {source}")]
    InvalidScale {
        attribute: String,
        source: ScaleError,
    },
    #[error("cupping attribute '{attribute}' has an invalid rule: {source}")]
    InvalidRule {
        attribute: String,
        source: RuleError,
    },
    #[error("no cupping attribute named '{0}'")]
    NotFound(String),
}

impl CuppingConfiguration {
    pub fn new(attributes: Vec<CuppingAttribute>) -> Self {
        Self { attributes }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Replace the attribute list with a copy of the template's attributes.
    pub fn load_template(&mut self, template: &CuppingAttributeTemplate) {
        self.attributes = template.attributes.clone();
    }

    pub fn add_attribute(&mut self, attribute: CuppingAttribute) -> Result<(), CuppingError> {
        if attribute.attribute.trim().is_empty() {
            return Err(CuppingError::EmptyName);
        }
        if self.position(&attribute.attribute).is_some() {
            return Err(CuppingError::DuplicateAttribute(attribute.attribute));
        }
        self.attributes.push(attribute);
        Ok(())
    }

    pub fn remove_attribute(&mut self, name: &str) -> Result<CuppingAttribute, CuppingError> {
        let index = self
            .position(name)
            .ok_or_else(|| CuppingError::NotFound(name.to_string()))?;
        Ok(self.attributes.remove(index))
    }

    pub fn set_required(&mut self, name: &str, required: bool) -> Result<(), CuppingError> {
        let index = self
            .position(name)
            .ok_or_else(|| CuppingError::NotFound(name.to_string()))?;
        self.attributes[index].is_required = required;
        Ok(())
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &CuppingAttribute> + '_ {
        self.attributes
            .iter()
            .filter(|attribute| attribute.is_required)
    }

    pub fn validate(&self, tolerance: f64) -> Result<(), CuppingError> {
        let mut seen = Vec::with_capacity(self.attributes.len());
        for attribute in &self.attributes {
            attribute.validate(tolerance)?;
            let key = normalized_key(&attribute.attribute);
            if seen.contains(&key) {
                return Err(CuppingError::DuplicateAttribute(attribute.attribute.clone()));
            }
            seen.push(key);
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalized_key(name);
        self.attributes
            .iter()
            .position(|attribute| normalized_key(&attribute.attribute) == key)
    }
}
