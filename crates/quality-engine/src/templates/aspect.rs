//! Ordinal visual-appearance scales for green and roasted coffee.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ordering::{self, normalized_key, Ordered};

pub const MIN_WORDING_VALUE: f64 = 1.0;
pub const MAX_WORDING_VALUE: f64 = 10.0;

/// One named appearance grade. `display_order` ascends with quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectWording {
    pub id: Uuid,
    pub label: String,
    pub value: f64,
    pub display_order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Ordered for AspectWording {
    fn display_order(&self) -> u32 {
        self.display_order
    }

    fn set_display_order(&mut self, order: u32) {
        self.display_order = order;
    }
}

/// Minimum grade a sample must reach. Always points at the value of an existing wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectValidation {
    pub min_acceptable_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectConfiguration {
    #[serde(default)]
    pub wordings: Vec<AspectWording>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<AspectValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AspectError {
    #[error("wording label must not be empty")]
    EmptyLabel,
    #[error("wording label '{0}' is used more than once")]
    DuplicateLabel(String),
    #[error("wording '{label}' has value {value}, expected 1 to 10")]
    ValueOutOfRange { label: String, value: f64 },
    #[error("minimum acceptable value {0} does not match any wording")]
    DanglingThreshold(f64),
    #[error("wording '{label}' has display order {found}, expected {expected}")]
    OutOfOrder {
        label: String,
        expected: u32,
        found: u32,
    },
    #[error("no wording with id {0}")]
    NotFound(Uuid),
}

impl AspectConfiguration {
    /// Never configured: no wordings and no threshold.
    pub fn is_empty(&self) -> bool {
        self.wordings.is_empty() && self.validation.is_none()
    }

    pub fn wording(&self, id: Uuid) -> Option<&AspectWording> {
        self.wordings.iter().find(|wording| wording.id == id)
    }

    pub fn wording_for_value(&self, value: f64) -> Option<&AspectWording> {
        self.wordings.iter().find(|wording| wording.value == value)
    }

    /// Append a wording at the end of the order and return its id.
    pub fn add_wording(
        &mut self,
        label: impl Into<String>,
        value: f64,
        description: Option<String>,
    ) -> Result<Uuid, AspectError> {
        let label = label.into();
        self.check_candidate(&label, value, None)?;

        let id = Uuid::new_v4();
        self.wordings.push(AspectWording {
            id,
            label,
            value,
            display_order: self.wordings.len() as u32,
            description,
        });
        Ok(id)
    }

    /// Change label/value of a wording in place. A threshold left without target is cleared.
    pub fn update_wording(
        &mut self,
        id: Uuid,
        label: impl Into<String>,
        value: f64,
    ) -> Result<(), AspectError> {
        let label = label.into();
        let index = self.index_of(id)?;
        self.check_candidate(&label, value, Some(id))?;

        let wording = &mut self.wordings[index];
        wording.label = label;
        wording.value = value;
        self.drop_dangling_threshold();
        Ok(())
    }

    /// Remove a wording, renumber the rest, and clear a threshold that pointed at its value.
    pub fn remove_wording(&mut self, id: Uuid) -> Result<AspectWording, AspectError> {
        let index = self.index_of(id)?;
        let removed = self.wordings.remove(index);
        ordering::renumber(&mut self.wordings);

        if self
            .validation
            .as_ref()
            .map_or(false, |validation| validation.min_acceptable_value == removed.value)
        {
            self.validation = None;
        }
        Ok(removed)
    }

    pub fn move_up(&mut self, id: Uuid) -> Result<bool, AspectError> {
        let index = self.index_of(id)?;
        Ok(ordering::move_up(&mut self.wordings, index))
    }

    pub fn move_down(&mut self, id: Uuid) -> Result<bool, AspectError> {
        let index = self.index_of(id)?;
        Ok(ordering::move_down(&mut self.wordings, index))
    }

    /// Set the threshold to the value of an existing wording.
    pub fn set_min_acceptable(
        &mut self,
        value: f64,
        validation_message: Option<String>,
    ) -> Result<(), AspectError> {
        if self.wording_for_value(value).is_none() {
            return Err(AspectError::DanglingThreshold(value));
        }
        self.validation = Some(AspectValidation {
            min_acceptable_value: value,
            validation_message,
        });
        Ok(())
    }

    pub fn clear_validation(&mut self) {
        self.validation = None;
    }

    pub fn validate(&self) -> Result<(), AspectError> {
        let mut seen = Vec::with_capacity(self.wordings.len());
        for wording in &self.wordings {
            if wording.label.trim().is_empty() {
                return Err(AspectError::EmptyLabel);
            }
            let key = normalized_key(&wording.label);
            if seen.contains(&key) {
                return Err(AspectError::DuplicateLabel(wording.label.clone()));
            }
            seen.push(key);
        }

        for wording in &self.wordings {
            check_value(&wording.label, wording.value)?;
        }

        if let Some(validation) = &self.validation {
            if self
                .wording_for_value(validation.min_acceptable_value)
                .is_none()
            {
                return Err(AspectError::DanglingThreshold(
                    validation.min_acceptable_value,
                ));
            }
        }

        if let Some((position, found)) = ordering::first_out_of_order(&self.wordings) {
            return Err(AspectError::OutOfOrder {
                label: self.wordings[position].label.clone(),
                expected: position as u32,
                found,
            });
        }
        Ok(())
    }

    fn index_of(&self, id: Uuid) -> Result<usize, AspectError> {
        self.wordings
            .iter()
            .position(|wording| wording.id == id)
            .ok_or(AspectError::NotFound(id))
    }

    fn check_candidate(
        &self,
        label: &str,
        value: f64,
        replacing: Option<Uuid>,
    ) -> Result<(), AspectError> {
        if label.trim().is_empty() {
            return Err(AspectError::EmptyLabel);
        }
        let key = normalized_key(label);
        if self
            .wordings
            .iter()
            .any(|wording| Some(wording.id) != replacing && normalized_key(&wording.label) == key)
        {
            return Err(AspectError::DuplicateLabel(label.to_string()));
        }
        check_value(label, value)
    }

    fn drop_dangling_threshold(&mut self) {
        let dangling = self.validation.as_ref().map_or(false, |validation| {
            self.wording_for_value(validation.min_acceptable_value)
                .is_none()
        });
        if dangling {
            self.validation = None;
        }
    }
}

fn check_value(label: &str, value: f64) -> Result<(), AspectError> {
    if value.is_finite() && (MIN_WORDING_VALUE..=MAX_WORDING_VALUE).contains(&value) {
        Ok(())
    } else {
        Err(AspectError::ValueOutOfRange {
            label: label.to_string(),
            value,
        })
    }
}
