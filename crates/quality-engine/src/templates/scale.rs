//! Measurement domains for quality attributes.
//!
//! Every attribute is measured either on a bounded numeric range stepped by an increment, or on
//! an ordered list of named options ("wordings") that map to numeric equivalents. Both variants
//! are handled exhaustively wherever a scale is consumed.

use serde::{Deserialize, Serialize};

use super::ordering::normalized_key;

/// Tagged union of the two interchangeable measurement domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scale {
    Numeric(NumericScale),
    Wording(WordingScale),
}

/// Bounded numeric range. A value belongs to the scale when it lies on the increment grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericScale {
    pub min: f64,
    pub max: f64,
    pub increment: f64,
}

/// Ordered options; position in `options` is the ascending rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordingScale {
    pub options: Vec<WordingOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordingOption {
    pub label: String,
    pub value: f64,
}

impl WordingOption {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Threshold attached to an attribute; its meaning depends on the scale it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationRule {
    Minimum { value: f64 },
    Maximum { value: f64 },
    Range { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScaleError {
    #[error("scale bounds and increment must be finite numbers")]
    NonFinite,
    #[error("min must be less than max (min {min}, max {max})")]
    MinNotBelowMax { min: f64, max: f64 },
    #[error("increment must be greater than zero (found {0})")]
    NonPositiveIncrement(f64),
    #[error("wording scale needs at least one option")]
    NoOptions,
    #[error("wording option #{position} has an empty label")]
    EmptyLabel { position: usize },
    #[error("wording option '{label}' has a non-finite value")]
    NonFiniteOption { label: String },
    #[error("duplicate wording option '{label}' with value {value}")]
    DuplicateOption { label: String, value: f64 },
    #[error("wording label '{label}' is used more than once")]
    DuplicateLabel { label: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("rule values must be finite numbers")]
    NonFinite,
    #[error("rule range requires min < max (min {min}, max {max})")]
    InvertedRange { min: f64, max: f64 },
    #[error("rule value {value} lies outside the scale bounds {min} to {max}")]
    OutOfBounds { value: f64, min: f64, max: f64 },
    #[error("rule value {value} is not reachable in steps of {increment}")]
    OffIncrement { value: f64, increment: f64 },
    #[error("wording range must run from a lower to a higher ranked option (min {min}, max {max})")]
    InvertedRankRange { min: f64, max: f64 },
    #[error("rule value {value} does not match any wording option")]
    UnknownWording { value: f64 },
}

impl NumericScale {
    pub fn new(min: f64, max: f64, increment: f64) -> Self {
        Self {
            min,
            max,
            increment,
        }
    }

    pub fn validate(&self) -> Result<(), ScaleError> {
        if !(self.min.is_finite() && self.max.is_finite() && self.increment.is_finite()) {
            return Err(ScaleError::NonFinite);
        }
        if self.min >= self.max {
            return Err(ScaleError::MinNotBelowMax {
                min: self.min,
                max: self.max,
            });
        }
        if self.increment <= 0.0 {
            return Err(ScaleError::NonPositiveIncrement(self.increment));
        }
        Ok(())
    }

    /// Whether `value` is inside the bounds and on the increment grid, within `tolerance`.
    pub fn accepts(&self, value: f64, tolerance: f64) -> bool {
        if !value.is_finite() || self.increment <= 0.0 {
            return false;
        }
        if value < self.min - tolerance || value > self.max + tolerance {
            return false;
        }
        let steps = (value - self.min) / self.increment;
        (steps - steps.round()).abs() * self.increment <= tolerance
    }
}

impl WordingScale {
    pub fn new(options: Vec<WordingOption>) -> Self {
        Self { options }
    }

    pub fn validate(&self) -> Result<(), ScaleError> {
        if self.options.is_empty() {
            return Err(ScaleError::NoOptions);
        }

        let mut seen: Vec<(String, f64)> = Vec::with_capacity(self.options.len());
        for (position, option) in self.options.iter().enumerate() {
            if option.label.trim().is_empty() {
                return Err(ScaleError::EmptyLabel { position });
            }
            if !option.value.is_finite() {
                return Err(ScaleError::NonFiniteOption {
                    label: option.label.clone(),
                });
            }

            let key = normalized_key(&option.label);
            if let Some((_, value)) = seen.iter().find(|(label, _)| *label == key) {
                return Err(if *value == option.value {
                    ScaleError::DuplicateOption {
                        label: option.label.clone(),
                        value: option.value,
                    }
                } else {
                    ScaleError::DuplicateLabel {
                        label: option.label.clone(),
                    }
                });
            }
            seen.push((key, option.value));
        }
        Ok(())
    }

    /// Position of the first option carrying `value`.
    pub fn rank_of(&self, value: f64) -> Option<usize> {
        self.options.iter().position(|option| option.value == value)
    }

    pub fn label_for(&self, value: f64) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }
}

impl Scale {
    pub fn numeric(min: f64, max: f64, increment: f64) -> Self {
        Scale::Numeric(NumericScale::new(min, max, increment))
    }

    pub fn wording(options: Vec<WordingOption>) -> Self {
        Scale::Wording(WordingScale::new(options))
    }

    pub fn validate(&self) -> Result<(), ScaleError> {
        validate_scale(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Scale::Numeric(_) => "numeric",
            Scale::Wording(_) => "wording",
        }
    }

    /// Check that a rule can be satisfied on this scale.
    ///
    /// Wording ranges are ordered by rank, the same way `admits` applies them.
    pub fn check_rule(&self, rule: &ValidationRule, tolerance: f64) -> Result<(), RuleError> {
        let values = match *rule {
            ValidationRule::Minimum { value } | ValidationRule::Maximum { value } => vec![value],
            ValidationRule::Range { min, max } => vec![min, max],
        };
        if values.iter().any(|value| !value.is_finite()) {
            return Err(RuleError::NonFinite);
        }

        match self {
            Scale::Numeric(scale) => {
                if let ValidationRule::Range { min, max } = *rule {
                    if min >= max {
                        return Err(RuleError::InvertedRange { min, max });
                    }
                }
                for value in values {
                    if value < scale.min - tolerance || value > scale.max + tolerance {
                        return Err(RuleError::OutOfBounds {
                            value,
                            min: scale.min,
                            max: scale.max,
                        });
                    }
                    if !scale.accepts(value, tolerance) {
                        return Err(RuleError::OffIncrement {
                            value,
                            increment: scale.increment,
                        });
                    }
                }
            }
            Scale::Wording(scale) => {
                let mut ranks = Vec::with_capacity(values.len());
                for value in values {
                    let rank = scale
                        .rank_of(value)
                        .ok_or(RuleError::UnknownWording { value })?;
                    ranks.push(rank);
                }
                if let (ValidationRule::Range { min, max }, [low, high]) = (*rule, ranks.as_slice())
                {
                    if low >= high {
                        return Err(RuleError::InvertedRankRange { min, max });
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply `rule` to an observed value. Wording scales compare ranks, not raw values.
    pub fn admits(&self, rule: &ValidationRule, observed: f64) -> bool {
        match self {
            Scale::Numeric(_) => match *rule {
                ValidationRule::Minimum { value } => observed >= value,
                ValidationRule::Maximum { value } => observed <= value,
                ValidationRule::Range { min, max } => observed >= min && observed <= max,
            },
            Scale::Wording(scale) => {
                let Some(rank) = scale.rank_of(observed) else {
                    return false;
                };
                let rank_of = |value: f64| scale.rank_of(value);
                match *rule {
                    ValidationRule::Minimum { value } => {
                        rank_of(value).map_or(false, |threshold| rank >= threshold)
                    }
                    ValidationRule::Maximum { value } => {
                        rank_of(value).map_or(false, |threshold| rank <= threshold)
                    }
                    ValidationRule::Range { min, max } => match (rank_of(min), rank_of(max)) {
                        (Some(low), Some(high)) => rank >= low && rank <= high,
                        _ => false,
                    },
                }
            }
        }
    }
}

pub fn validate_scale(scale: &Scale) -> Result<(), ScaleError> {
    match scale {
        Scale::Numeric(numeric) => numeric.validate(),
        Scale::Wording(wording) => wording.validate(),
    }
}

/// Human-readable rendering of a rule, e.g. `≥7.0` or `≥Fine`.
///
/// Wording scales render the option label when the rule value maps to one and fall back to the
/// number otherwise, so both scale kinds read the same way in summaries.
pub fn format_validation_rule(rule: &ValidationRule, scale: &Scale) -> String {
    let render = |value: f64| match scale {
        Scale::Numeric(_) => format_number(value),
        Scale::Wording(wording) => wording
            .label_for(value)
            .map(str::to_string)
            .unwrap_or_else(|| format_number(value)),
    };

    match *rule {
        ValidationRule::Minimum { value } => format!("≥{}", render(value)),
        ValidationRule::Maximum { value } => format!("≤{}", render(value)),
        ValidationRule::Range { min, max } => format!("{} to {}", render(min), render(max)),
    }
}

/// Whole numbers keep one decimal place; fractional values print as-is.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
