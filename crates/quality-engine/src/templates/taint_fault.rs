//! Sensory taints and faults, each measured on its own intensity scale, plus the acceptance rules
//! that combine them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ordering::{self, normalized_key, Ordered};
use super::scale::{Scale, ScaleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaintFaultKind {
    Taint,
    Fault,
}

impl TaintFaultKind {
    pub const fn label(self) -> &'static str {
        match self {
            TaintFaultKind::Taint => "taint",
            TaintFaultKind::Fault => "fault",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaintFaultDefinition {
    pub id: Uuid,
    pub name: String,
    pub scale: Scale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub display_order: u32,
}

impl TaintFaultDefinition {
    pub fn new(name: impl Into<String>, scale: Scale) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            scale,
            description: None,
            display_order: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Ordered for TaintFaultDefinition {
    fn display_order(&self) -> u32 {
        self.display_order
    }

    fn set_display_order(&mut self, order: u32) {
        self.display_order = order;
    }
}

/// Acceptance rules. With `zero_tolerance` set every other limit is inert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaintFaultValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_tolerance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_taints: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_faults: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_combined: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_taint_intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fault_intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

impl TaintFaultValidationRules {
    pub fn zero_tolerance() -> Self {
        Self {
            zero_tolerance: Some(true),
            ..Self::default()
        }
    }

    pub fn is_zero_tolerance(&self) -> bool {
        self.zero_tolerance == Some(true)
    }

    /// Whether any rule restricts a sample at all.
    pub fn is_active(&self) -> bool {
        self.is_zero_tolerance()
            || self.max_taints.is_some()
            || self.max_faults.is_some()
            || self.max_combined.is_some()
            || self.max_taint_intensity.is_some()
            || self.max_fault_intensity.is_some()
    }

    /// Toggling on clears every limit; toggling off restores an empty, unlimited rule set
    /// rather than the previous limits.
    pub fn set_zero_tolerance(&mut self, enabled: bool) {
        *self = if enabled {
            Self::zero_tolerance()
        } else {
            Self::default()
        };
    }

    fn validate(&self) -> Result<(), TaintFaultError> {
        if self.is_zero_tolerance() {
            return Ok(());
        }
        for (field, value) in [
            ("max_taint_intensity", self.max_taint_intensity),
            ("max_fault_intensity", self.max_fault_intensity),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(TaintFaultError::InvalidIntensityCap { field, value });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaintFaultConfiguration {
    #[serde(default)]
    pub taints: Vec<TaintFaultDefinition>,
    #[serde(default)]
    pub faults: Vec<TaintFaultDefinition>,
    #[serde(default)]
    pub rules: TaintFaultValidationRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Summary counts used by listings; not a grading result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintFaultStats {
    pub taint_count: usize,
    pub fault_count: usize,
    pub total_definitions: usize,
    pub has_active_rules: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaintFaultError {
    #[error("{} name must not be empty", .kind.label())]
    EmptyName { kind: TaintFaultKind },
    #[error("{} '{name}' is defined more than once", .kind.label())]
    DuplicateName { kind: TaintFaultKind, name: String },
    #[error("{} '{name}' has an invalid scale: {source}", .kind.label())]
    InvalidScale {
        kind: TaintFaultKind,
        name: String,
        source: ScaleError,
    },
    #[error("{} '{name}' has display order {found}, expected {expected}", .kind.label())]
    OutOfOrder {
        kind: TaintFaultKind,
        name: String,
        expected: u32,
        found: u32,
    },
    #[error("{field} must be a non-negative number (found {value})")]
    InvalidIntensityCap { field: &'static str, value: f64 },
    #[error("no {} with id {id}", .kind.label())]
    NotFound { kind: TaintFaultKind, id: Uuid },
}

impl TaintFaultConfiguration {
    pub fn is_empty(&self) -> bool {
        self.taints.is_empty() && self.faults.is_empty() && !self.rules.is_active()
    }

    pub fn definitions(&self, kind: TaintFaultKind) -> &[TaintFaultDefinition] {
        match kind {
            TaintFaultKind::Taint => &self.taints,
            TaintFaultKind::Fault => &self.faults,
        }
    }

    fn definitions_mut(&mut self, kind: TaintFaultKind) -> &mut Vec<TaintFaultDefinition> {
        match kind {
            TaintFaultKind::Taint => &mut self.taints,
            TaintFaultKind::Fault => &mut self.faults,
        }
    }

    pub fn add_taint(&mut self, definition: TaintFaultDefinition) -> Result<Uuid, TaintFaultError> {
        self.add(TaintFaultKind::Taint, definition)
    }

    pub fn add_fault(&mut self, definition: TaintFaultDefinition) -> Result<Uuid, TaintFaultError> {
        self.add(TaintFaultKind::Fault, definition)
    }

    /// Append a definition after checking its name and scale.
    pub fn add(
        &mut self,
        kind: TaintFaultKind,
        mut definition: TaintFaultDefinition,
    ) -> Result<Uuid, TaintFaultError> {
        check_definition(kind, &definition)?;
        let key = normalized_key(&definition.name);
        if self
            .definitions(kind)
            .iter()
            .any(|existing| normalized_key(&existing.name) == key)
        {
            return Err(TaintFaultError::DuplicateName {
                kind,
                name: definition.name,
            });
        }

        let list = self.definitions_mut(kind);
        definition.display_order = list.len() as u32;
        let id = definition.id;
        list.push(definition);
        Ok(id)
    }

    pub fn remove(
        &mut self,
        kind: TaintFaultKind,
        id: Uuid,
    ) -> Result<TaintFaultDefinition, TaintFaultError> {
        let index = self.index_of(kind, id)?;
        let list = self.definitions_mut(kind);
        let removed = list.remove(index);
        ordering::renumber(list);
        Ok(removed)
    }

    pub fn move_up(&mut self, kind: TaintFaultKind, id: Uuid) -> Result<bool, TaintFaultError> {
        let index = self.index_of(kind, id)?;
        Ok(ordering::move_up(self.definitions_mut(kind), index))
    }

    pub fn move_down(&mut self, kind: TaintFaultKind, id: Uuid) -> Result<bool, TaintFaultError> {
        let index = self.index_of(kind, id)?;
        Ok(ordering::move_down(self.definitions_mut(kind), index))
    }

    pub fn set_zero_tolerance(&mut self, enabled: bool) {
        self.rules.set_zero_tolerance(enabled);
    }

    /// Replace taints, faults, and rules with a preset catalogue.
    pub fn load_preset(&mut self, preset: TaintFaultConfiguration) {
        *self = preset;
    }

    pub fn validate(&self) -> Result<(), TaintFaultError> {
        validate_definitions(TaintFaultKind::Taint, &self.taints)?;
        validate_definitions(TaintFaultKind::Fault, &self.faults)?;
        self.rules.validate()
    }

    fn index_of(&self, kind: TaintFaultKind, id: Uuid) -> Result<usize, TaintFaultError> {
        self.definitions(kind)
            .iter()
            .position(|definition| definition.id == id)
            .ok_or(TaintFaultError::NotFound { kind, id })
    }
}

pub fn calculate_taint_fault_stats(config: &TaintFaultConfiguration) -> TaintFaultStats {
    let taint_count = config.taints.len();
    let fault_count = config.faults.len();
    TaintFaultStats {
        taint_count,
        fault_count,
        total_definitions: taint_count + fault_count,
        has_active_rules: config.rules.is_active(),
    }
}

fn check_definition(
    kind: TaintFaultKind,
    definition: &TaintFaultDefinition,
) -> Result<(), TaintFaultError> {
    if definition.name.trim().is_empty() {
        return Err(TaintFaultError::EmptyName { kind });
    }
    definition
        .scale
        .validate()
        .map_err(|source| TaintFaultError::InvalidScale {
            kind,
            name: definition.name.clone(),
            source,
        })
}

fn validate_definitions(
    kind: TaintFaultKind,
    definitions: &[TaintFaultDefinition],
) -> Result<(), TaintFaultError> {
    let mut seen = Vec::with_capacity(definitions.len());
    for definition in definitions {
        check_definition(kind, definition)?;
        let key = normalized_key(&definition.name);
        if seen.contains(&key) {
            return Err(TaintFaultError::DuplicateName {
                kind,
                name: definition.name.clone(),
            });
        }
        seen.push(key);
    }

    if let Some((position, found)) = ordering::first_out_of_order(definitions) {
        return Err(TaintFaultError::OutOfOrder {
            kind,
            name: definitions[position].name.clone(),
            expected: position as u32,
            found,
        });
    }
    Ok(())
}
