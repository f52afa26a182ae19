//! Per-sieve acceptance rules over a sample's size distribution.

use serde::{Deserialize, Serialize};

use super::ordering::{self, normalized_key, Ordered};
use super::scale::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    Minimum,
    Maximum,
    Range,
    Any,
}

/// Acceptance rule for one sieve, expressed as a percentage of sample weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSizeConstraint {
    pub screen_size: String,
    pub constraint_type: ConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    pub display_order: u32,
}

impl Ordered for ScreenSizeConstraint {
    fn display_order(&self) -> u32 {
        self.display_order
    }

    fn set_display_order(&mut self, order: u32) {
        self.display_order = order;
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScreenSizeError {
    #[error("screen size identifier must not be empty")]
    EmptyScreenSize,
    #[error("{screen_size}: {constraint:?} constraint requires {field}")]
    MissingValue {
        screen_size: String,
        constraint: ConstraintType,
        field: &'static str,
    },
    #[error("{screen_size}: {field} {value} must be between 0 and 100")]
    OutOfRange {
        screen_size: String,
        field: &'static str,
        value: f64,
    },
    #[error("{screen_size}: range requires min < max (min {min}, max {max})")]
    InvertedRange {
        screen_size: String,
        min: f64,
        max: f64,
    },
    #[error("{screen_size}: {constraint:?} constraint must not set {field}")]
    UnexpectedValue {
        screen_size: String,
        constraint: ConstraintType,
        field: &'static str,
    },
    #[error("screen size '{0}' is constrained more than once")]
    Duplicate(String),
    #[error("screen size '{screen_size}' has display order {found}, expected {expected}")]
    OutOfOrder {
        screen_size: String,
        expected: u32,
        found: u32,
    },
    #[error("no screen size constraint named '{0}'")]
    NotFound(String),
}

impl ScreenSizeConstraint {
    pub fn minimum(screen_size: impl Into<String>, min_value: f64) -> Self {
        Self::build(screen_size, ConstraintType::Minimum, Some(min_value), None)
    }

    pub fn maximum(screen_size: impl Into<String>, max_value: f64) -> Self {
        Self::build(screen_size, ConstraintType::Maximum, None, Some(max_value))
    }

    pub fn range(screen_size: impl Into<String>, min_value: f64, max_value: f64) -> Self {
        Self::build(
            screen_size,
            ConstraintType::Range,
            Some(min_value),
            Some(max_value),
        )
    }

    pub fn any(screen_size: impl Into<String>) -> Self {
        Self::build(screen_size, ConstraintType::Any, None, None)
    }

    fn build(
        screen_size: impl Into<String>,
        constraint_type: ConstraintType,
        min_value: Option<f64>,
        max_value: Option<f64>,
    ) -> Self {
        Self {
            screen_size: screen_size.into(),
            constraint_type,
            min_value,
            max_value,
            display_order: 0,
        }
    }

    /// Display string for the rule alone, e.g. `≥60.0%` or `40.0% to 60.0%`.
    pub fn display_text(&self) -> String {
        let percent = |value: Option<f64>| {
            value
                .map(|value| format!("{}%", format_number(value)))
                .unwrap_or_else(|| "?".to_string())
        };

        match self.constraint_type {
            ConstraintType::Minimum => format!("≥{}", percent(self.min_value)),
            ConstraintType::Maximum => format!("≤{}", percent(self.max_value)),
            ConstraintType::Range => format!(
                "{} to {}",
                percent(self.min_value),
                percent(self.max_value)
            ),
            ConstraintType::Any => "any".to_string(),
        }
    }

    /// Type-specific numeric invariants.
    pub fn validate(&self) -> Result<(), ScreenSizeError> {
        if self.screen_size.trim().is_empty() {
            return Err(ScreenSizeError::EmptyScreenSize);
        }

        match self.constraint_type {
            ConstraintType::Minimum => {
                self.reject(self.max_value, "max_value")?;
                let min = self.require(self.min_value, "min_value")?;
                self.percentage(min, "min_value")
            }
            ConstraintType::Maximum => {
                self.reject(self.min_value, "min_value")?;
                let max = self.require(self.max_value, "max_value")?;
                self.percentage(max, "max_value")
            }
            ConstraintType::Range => {
                let min = self.require(self.min_value, "min_value")?;
                let max = self.require(self.max_value, "max_value")?;
                self.percentage(min, "min_value")?;
                self.percentage(max, "max_value")?;
                if min >= max {
                    return Err(ScreenSizeError::InvertedRange {
                        screen_size: self.screen_size.clone(),
                        min,
                        max,
                    });
                }
                Ok(())
            }
            ConstraintType::Any => {
                self.reject(self.min_value, "min_value")?;
                self.reject(self.max_value, "max_value")
            }
        }
    }

    fn require(&self, value: Option<f64>, field: &'static str) -> Result<f64, ScreenSizeError> {
        value.ok_or_else(|| ScreenSizeError::MissingValue {
            screen_size: self.screen_size.clone(),
            constraint: self.constraint_type,
            field,
        })
    }

    fn reject(&self, value: Option<f64>, field: &'static str) -> Result<(), ScreenSizeError> {
        match value {
            Some(_) => Err(ScreenSizeError::UnexpectedValue {
                screen_size: self.screen_size.clone(),
                constraint: self.constraint_type,
                field,
            }),
            None => Ok(()),
        }
    }

    fn percentage(&self, value: f64, field: &'static str) -> Result<(), ScreenSizeError> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(())
        } else {
            Err(ScreenSizeError::OutOfRange {
                screen_size: self.screen_size.clone(),
                field,
                value,
            })
        }
    }
}

/// The set of constraints of one template, keyed by `screen_size` and kept in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenSizeRequirements {
    pub constraints: Vec<ScreenSizeConstraint>,
}

impl ScreenSizeRequirements {
    pub fn new(constraints: Vec<ScreenSizeConstraint>) -> Self {
        let mut requirements = Self { constraints };
        ordering::renumber(&mut requirements.constraints);
        requirements
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn get(&self, screen_size: &str) -> Option<&ScreenSizeConstraint> {
        self.position(screen_size)
            .map(|index| &self.constraints[index])
    }

    /// Append a constraint, rejecting duplicates of an existing sieve.
    pub fn add(&mut self, mut constraint: ScreenSizeConstraint) -> Result<(), ScreenSizeError> {
        if self.position(&constraint.screen_size).is_some() {
            return Err(ScreenSizeError::Duplicate(constraint.screen_size));
        }
        constraint.display_order = self.constraints.len() as u32;
        self.constraints.push(constraint);
        Ok(())
    }

    /// Replace the rule of an existing sieve in place, keeping its position.
    pub fn replace(&mut self, constraint: ScreenSizeConstraint) -> Result<(), ScreenSizeError> {
        let index = self
            .position(&constraint.screen_size)
            .ok_or_else(|| ScreenSizeError::NotFound(constraint.screen_size.clone()))?;
        let display_order = self.constraints[index].display_order;
        self.constraints[index] = ScreenSizeConstraint {
            display_order,
            ..constraint
        };
        Ok(())
    }

    pub fn remove(&mut self, screen_size: &str) -> Result<ScreenSizeConstraint, ScreenSizeError> {
        let index = self
            .position(screen_size)
            .ok_or_else(|| ScreenSizeError::NotFound(screen_size.to_string()))?;
        let removed = self.constraints.remove(index);
        ordering::renumber(&mut self.constraints);
        Ok(removed)
    }

    pub fn move_up(&mut self, screen_size: &str) -> bool {
        match self.position(screen_size) {
            Some(index) => ordering::move_up(&mut self.constraints, index),
            None => false,
        }
    }

    pub fn move_down(&mut self, screen_size: &str) -> bool {
        match self.position(screen_size) {
            Some(index) => ordering::move_down(&mut self.constraints, index),
            None => false,
        }
    }

    /// Structural validation of the set. Emptiness is checked by the template validator.
    pub fn validate(&self) -> Result<(), ScreenSizeError> {
        let mut seen = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            let key = normalized_key(&constraint.screen_size);
            if seen.contains(&key) {
                return Err(ScreenSizeError::Duplicate(constraint.screen_size.clone()));
            }
            seen.push(key);
        }

        for constraint in &self.constraints {
            constraint.validate()?;
        }

        if let Some((position, found)) = ordering::first_out_of_order(&self.constraints) {
            return Err(ScreenSizeError::OutOfOrder {
                screen_size: self.constraints[position].screen_size.clone(),
                expected: position as u32,
                found,
            });
        }
        Ok(())
    }

    fn position(&self, screen_size: &str) -> Option<usize> {
        let key = normalized_key(screen_size);
        self.constraints
            .iter()
            .position(|constraint| normalized_key(&constraint.screen_size) == key)
    }
}
