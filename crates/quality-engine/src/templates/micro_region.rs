//! Origin-specific micro-region sourcing requirements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ordering::normalized_key;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentageBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroRegionRequirement {
    pub origin: String,
    #[serde(default)]
    pub required_micro_regions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_per_region: Option<BTreeMap<String, PercentageBounds>>,
    #[serde(default)]
    pub allow_mix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroRegionConfiguration {
    #[serde(default)]
    pub requirements: Vec<MicroRegionRequirement>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MicroRegionError {
    #[error("micro-region requirement origin must not be empty")]
    EmptyOrigin,
    #[error("origin '{0}' has more than one micro-region requirement")]
    DuplicateOrigin(String),
    #[error("{origin}: micro-region names must not be empty")]
    EmptyRegion { origin: String },
    #[error("{origin}: micro-region '{region}' is listed more than once")]
    DuplicateRegion { origin: String, region: String },
    #[error("{origin}: percentage bounds reference undeclared micro-region '{region}'")]
    UndeclaredRegion { origin: String, region: String },
    #[error("{origin}: percentage bounds for '{region}' are given more than once")]
    DuplicateBounds { origin: String, region: String },
    #[error("{origin}: {region} percentage {value} must be between 0 and 100")]
    PercentageOutOfRange {
        origin: String,
        region: String,
        value: f64,
    },
    #[error("{origin}: {region} requires min <= max (min {min}, max {max})")]
    InvertedBounds {
        origin: String,
        region: String,
        min: f64,
        max: f64,
    },
    #[error("{origin}: minimum percentages add up to {total}, more than 100")]
    MinimumsExceedWhole { origin: String, total: f64 },
}

impl MicroRegionRequirement {
    pub fn validate(&self) -> Result<(), MicroRegionError> {
        if self.origin.trim().is_empty() {
            return Err(MicroRegionError::EmptyOrigin);
        }
        let origin = || self.origin.clone();

        let mut declared = Vec::with_capacity(self.required_micro_regions.len());
        for region in &self.required_micro_regions {
            if region.trim().is_empty() {
                return Err(MicroRegionError::EmptyRegion { origin: origin() });
            }
            let key = normalized_key(region);
            if declared.contains(&key) {
                return Err(MicroRegionError::DuplicateRegion {
                    origin: origin(),
                    region: region.clone(),
                });
            }
            declared.push(key);
        }

        let Some(percentages) = &self.percentage_per_region else {
            return Ok(());
        };

        let mut minimum_total = 0.0;
        let mut bounded = Vec::with_capacity(percentages.len());
        for (region, bounds) in percentages {
            let key = normalized_key(region);
            if !declared.contains(&key) {
                return Err(MicroRegionError::UndeclaredRegion {
                    origin: origin(),
                    region: region.clone(),
                });
            }
            if bounded.contains(&key) {
                return Err(MicroRegionError::DuplicateBounds {
                    origin: origin(),
                    region: region.clone(),
                });
            }
            bounded.push(key);
            for value in [bounds.min, bounds.max].into_iter().flatten() {
                if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                    return Err(MicroRegionError::PercentageOutOfRange {
                        origin: origin(),
                        region: region.clone(),
                        value,
                    });
                }
            }
            if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                if min > max {
                    return Err(MicroRegionError::InvertedBounds {
                        origin: origin(),
                        region: region.clone(),
                        min,
                        max,
                    });
                }
            }
            minimum_total += bounds.min.unwrap_or(0.0);
        }

        if minimum_total > 100.0 {
            return Err(MicroRegionError::MinimumsExceedWhole {
                origin: origin(),
                total: minimum_total,
            });
        }
        Ok(())
    }
}

impl MicroRegionConfiguration {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirement_for(&self, origin: &str) -> Option<&MicroRegionRequirement> {
        let key = normalized_key(origin);
        self.requirements
            .iter()
            .find(|requirement| normalized_key(&requirement.origin) == key)
    }

    pub fn validate(&self) -> Result<(), MicroRegionError> {
        let mut seen = Vec::with_capacity(self.requirements.len());
        for requirement in &self.requirements {
            requirement.validate()?;
            let key = normalized_key(&requirement.origin);
            if seen.contains(&key) {
                return Err(MicroRegionError::DuplicateOrigin(requirement.origin.clone()));
            }
            seen.push(key);
        }
        Ok(())
    }
}
