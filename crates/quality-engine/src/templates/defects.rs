//! Weighted physical-defect catalogue with aggregate thresholds.
//!
//! Thresholds apply to weighted defect equivalents counted in a sample of the template's
//! `sample_size_grams`. Scaling to a differently sized physical sample belongs to whoever
//! evaluates the sample.

use serde::{Deserialize, Serialize};

use super::ordering::{self, normalized_key, Ordered};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectCategory {
    Primary,
    Secondary,
}

impl DefectCategory {
    pub const fn label(self) -> &'static str {
        match self {
            DefectCategory::Primary => "primary",
            DefectCategory::Secondary => "secondary",
        }
    }
}

/// A catalogued defect. `display_order` is the position inside its own category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectDefinition {
    pub name: String,
    pub category: DefectCategory,
    pub weight: f64,
    pub display_order: u32,
}

impl Ordered for DefectDefinition {
    fn display_order(&self) -> u32 {
        self.display_order
    }

    fn set_display_order(&mut self, order: u32) {
        self.display_order = order;
    }
}

/// Aggregate limits; an unset limit is unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_primary: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_secondary: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total: Option<u32>,
}

impl DefectThresholds {
    pub fn is_unlimited(&self) -> bool {
        self.max_primary.is_none() && self.max_secondary.is_none() && self.max_total.is_none()
    }

    /// Soft inconsistencies: a total limit stricter than a per-category limit.
    pub fn warnings(&self) -> Vec<String> {
        let Some(max_total) = self.max_total else {
            return Vec::new();
        };

        [
            ("max_primary", self.max_primary),
            ("max_secondary", self.max_secondary),
        ]
        .into_iter()
        .filter_map(|(field, limit)| limit.map(|limit| (field, limit)))
        .filter(|(_, limit)| max_total < *limit)
        .map(|(field, limit)| {
            format!("max_total {max_total} is stricter than {field} {limit}; the {field} limit can never be reached")
        })
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefectConfiguration {
    #[serde(default)]
    pub defects: Vec<DefectDefinition>,
    #[serde(default)]
    pub thresholds: DefectThresholds,
}

/// Outcome of a successful validation; warnings never make a configuration invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectReport {
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefectError {
    #[error("{} defect name must not be empty", .category.label())]
    EmptyName { category: DefectCategory },
    #[error("{} defect '{name}' is listed more than once", .category.label())]
    DuplicateName {
        category: DefectCategory,
        name: String,
    },
    #[error("defect '{name}' must have a positive weight (found {weight})")]
    NonPositiveWeight { name: String, weight: f64 },
    #[error("{} defect '{name}' has display order {found}, expected {expected}", .category.label())]
    OutOfOrder {
        category: DefectCategory,
        name: String,
        expected: u32,
        found: u32,
    },
    #[error("no {} defect named '{name}'", .category.label())]
    NotFound {
        category: DefectCategory,
        name: String,
    },
}

impl DefectConfiguration {
    pub fn is_empty(&self) -> bool {
        self.defects.is_empty() && self.thresholds.is_unlimited()
    }

    pub fn defects_in(
        &self,
        category: DefectCategory,
    ) -> impl Iterator<Item = &DefectDefinition> + '_ {
        self.defects
            .iter()
            .filter(move |defect| defect.category == category)
    }

    pub fn total_weight(&self, category: DefectCategory) -> f64 {
        self.defects_in(category).map(|defect| defect.weight).sum()
    }

    /// Append a defect at the end of its category.
    pub fn add_defect(
        &mut self,
        name: impl Into<String>,
        category: DefectCategory,
        weight: f64,
    ) -> Result<(), DefectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DefectError::EmptyName { category });
        }
        if self.find(category, &name).is_some() {
            return Err(DefectError::DuplicateName { category, name });
        }
        check_weight(&name, weight)?;

        let display_order = self.defects_in(category).count() as u32;
        self.defects.push(DefectDefinition {
            name,
            category,
            weight,
            display_order,
        });
        Ok(())
    }

    pub fn update_weight(
        &mut self,
        category: DefectCategory,
        name: &str,
        weight: f64,
    ) -> Result<(), DefectError> {
        check_weight(name, weight)?;
        let index = self.require(category, name)?;
        self.defects[index].weight = weight;
        Ok(())
    }

    /// Remove a defect and renumber only its own category.
    pub fn remove_defect(
        &mut self,
        category: DefectCategory,
        name: &str,
    ) -> Result<DefectDefinition, DefectError> {
        let index = self.require(category, name)?;
        let removed = self.defects.remove(index);
        self.renumber_category(category);
        Ok(removed)
    }

    pub fn move_defect_up(
        &mut self,
        category: DefectCategory,
        name: &str,
    ) -> Result<bool, DefectError> {
        self.shift(category, name, true)
    }

    pub fn move_defect_down(
        &mut self,
        category: DefectCategory,
        name: &str,
    ) -> Result<bool, DefectError> {
        self.shift(category, name, false)
    }

    pub fn set_thresholds(&mut self, thresholds: DefectThresholds) {
        self.thresholds = thresholds;
    }

    /// Replace the whole configuration with a preset. Presets are never merged.
    pub fn load_preset(&mut self, preset: DefectConfiguration) {
        *self = preset;
    }

    pub fn validate(&self) -> Result<DefectReport, DefectError> {
        for category in [DefectCategory::Primary, DefectCategory::Secondary] {
            let mut seen = Vec::new();
            for defect in self.defects_in(category) {
                if defect.name.trim().is_empty() {
                    return Err(DefectError::EmptyName { category });
                }
                let key = normalized_key(&defect.name);
                if seen.contains(&key) {
                    return Err(DefectError::DuplicateName {
                        category,
                        name: defect.name.clone(),
                    });
                }
                seen.push(key);
            }
        }

        for defect in &self.defects {
            check_weight(&defect.name, defect.weight)?;
        }

        for category in [DefectCategory::Primary, DefectCategory::Secondary] {
            if let Some((position, found)) = ordering::first_out_of_order(self.defects_in(category))
            {
                let name = self
                    .defects_in(category)
                    .nth(position)
                    .map(|defect| defect.name.clone())
                    .unwrap_or_default();
                return Err(DefectError::OutOfOrder {
                    category,
                    name,
                    expected: position as u32,
                    found,
                });
            }
        }

        Ok(DefectReport {
            warnings: self.thresholds.warnings(),
        })
    }

    fn find(&self, category: DefectCategory, name: &str) -> Option<usize> {
        let key = normalized_key(name);
        self.defects.iter().position(|defect| {
            defect.category == category && normalized_key(&defect.name) == key
        })
    }

    fn require(&self, category: DefectCategory, name: &str) -> Result<usize, DefectError> {
        self.find(category, name).ok_or_else(|| DefectError::NotFound {
            category,
            name: name.to_string(),
        })
    }

    fn shift(&mut self, category: DefectCategory, name: &str, up: bool) -> Result<bool, DefectError> {
        let index = self.require(category, name)?;
        let positions: Vec<usize> = self
            .defects
            .iter()
            .enumerate()
            .filter(|(_, defect)| defect.category == category)
            .map(|(position, _)| position)
            .collect();
        let slot = positions
            .iter()
            .position(|position| *position == index)
            .unwrap_or_default();

        let neighbour = if up {
            slot.checked_sub(1)
        } else {
            Some(slot + 1).filter(|next| *next < positions.len())
        };
        let Some(neighbour) = neighbour else {
            return Ok(false);
        };

        self.defects.swap(positions[slot], positions[neighbour]);
        self.renumber_category(category);
        Ok(true)
    }

    fn renumber_category(&mut self, category: DefectCategory) {
        ordering::renumber_each(
            self.defects
                .iter_mut()
                .filter(|defect| defect.category == category),
        );
    }
}

fn check_weight(name: &str, weight: f64) -> Result<(), DefectError> {
    if weight.is_finite() && weight > 0.0 {
        Ok(())
    } else {
        Err(DefectError::NonPositiveWeight {
            name: name.to_string(),
            weight,
        })
    }
}
