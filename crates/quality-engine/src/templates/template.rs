use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::aspect::AspectConfiguration;
use super::cupping::CuppingConfiguration;
use super::defects::DefectConfiguration;
use super::micro_region::MicroRegionConfiguration;
use super::screen_size::ScreenSizeRequirements;
use super::taint_fault::TaintFaultConfiguration;

/// Opaque laboratory identity supplied by the host application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaboratoryId(pub String);

/// Who can see a template. Exactly one of the three shapes holds at any time.
///
/// Decoding rejects payloads that name one shape and carry data of another, such as a global
/// scope with laboratory ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SharingScope {
    Global,
    Laboratories { laboratory_ids: Vec<LaboratoryId> },
    #[default]
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SharingScopeError {
    #[error("a global template cannot also be assigned to laboratories ({0} assigned)")]
    GlobalWithLaboratories(usize),
    #[error("a private template cannot be assigned to laboratories ({0} assigned)")]
    PrivateWithLaboratories(usize),
    #[error("laboratory sharing requires at least one laboratory")]
    NoLaboratories,
    #[error("laboratory '{0}' is assigned more than once")]
    DuplicateLaboratory(String),
    #[error("sharing scope and legacy is_global/laboratory_ids fields disagree")]
    ConflictingShapes,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScopeTag {
    Global,
    Laboratories,
    Private,
}

/// Wire shape of `sharing`, kept loose so contradictions can be reported instead of dropped.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSharingScope {
    #[serde(default)]
    scope: Option<ScopeTag>,
    #[serde(default)]
    laboratory_ids: Option<Vec<LaboratoryId>>,
    #[serde(default)]
    is_global: Option<bool>,
}

impl TryFrom<RawSharingScope> for SharingScope {
    type Error = SharingScopeError;

    fn try_from(raw: RawSharingScope) -> Result<Self, Self::Error> {
        let laboratory_ids = raw.laboratory_ids.unwrap_or_default();
        match (raw.scope, raw.is_global) {
            (None, is_global) => SharingScope::from_flags(is_global.unwrap_or(false), laboratory_ids),
            (Some(ScopeTag::Global), Some(false)) => Err(SharingScopeError::ConflictingShapes),
            (Some(ScopeTag::Global), _) if !laboratory_ids.is_empty() => Err(
                SharingScopeError::GlobalWithLaboratories(laboratory_ids.len()),
            ),
            (Some(ScopeTag::Global), _) => Ok(SharingScope::Global),
            (Some(ScopeTag::Laboratories), Some(true)) => Err(
                SharingScopeError::GlobalWithLaboratories(laboratory_ids.len()),
            ),
            (Some(ScopeTag::Laboratories), _) => Ok(SharingScope::Laboratories { laboratory_ids }),
            (Some(ScopeTag::Private), Some(true)) => Err(SharingScopeError::ConflictingShapes),
            (Some(ScopeTag::Private), _) if !laboratory_ids.is_empty() => Err(
                SharingScopeError::PrivateWithLaboratories(laboratory_ids.len()),
            ),
            (Some(ScopeTag::Private), _) => Ok(SharingScope::Private),
        }
    }
}

impl<'de> Deserialize<'de> for SharingScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawSharingScope::deserialize(deserializer)?;
        SharingScope::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl SharingScope {
    /// Convert the boolean-plus-list shape used by older payloads.
    pub fn from_flags(
        is_global: bool,
        laboratory_ids: Vec<LaboratoryId>,
    ) -> Result<Self, SharingScopeError> {
        match (is_global, laboratory_ids.is_empty()) {
            (true, false) => Err(SharingScopeError::GlobalWithLaboratories(
                laboratory_ids.len(),
            )),
            (true, true) => Ok(SharingScope::Global),
            (false, true) => Ok(SharingScope::Private),
            (false, false) => Ok(SharingScope::Laboratories { laboratory_ids }),
        }
    }

    /// Assigning laboratories always leaves global sharing; an empty set means private.
    pub fn assign_laboratories(&mut self, laboratory_ids: Vec<LaboratoryId>) {
        *self = if laboratory_ids.is_empty() {
            SharingScope::Private
        } else {
            SharingScope::Laboratories { laboratory_ids }
        };
    }

    pub fn make_global(&mut self) {
        *self = SharingScope::Global;
    }

    pub fn make_private(&mut self) {
        *self = SharingScope::Private;
    }

    pub fn is_global(&self) -> bool {
        matches!(self, SharingScope::Global)
    }

    pub fn laboratory_ids(&self) -> &[LaboratoryId] {
        match self {
            SharingScope::Laboratories { laboratory_ids } => laboratory_ids,
            SharingScope::Global | SharingScope::Private => &[],
        }
    }

    pub fn validate(&self) -> Result<(), SharingScopeError> {
        let SharingScope::Laboratories { laboratory_ids } = self else {
            return Ok(());
        };
        if laboratory_ids.is_empty() {
            return Err(SharingScopeError::NoLaboratories);
        }
        let mut seen = Vec::with_capacity(laboratory_ids.len());
        for id in laboratory_ids {
            if seen.contains(&id) {
                return Err(SharingScopeError::DuplicateLaboratory(id.0.clone()));
            }
            seen.push(id);
        }
        Ok(())
    }
}

/// Persisted, transmitted rule set of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size_grams: Option<f64>,
    #[serde(default)]
    pub screen_size_requirements: ScreenSizeRequirements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_aspect_configuration: Option<AspectConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_configuration: Option<DefectConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_max: Option<f64>,
    #[serde(default)]
    pub moisture_standard: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roast_aspect_configuration: Option<AspectConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roast_sample_size_grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quakers: Option<u32>,
    #[serde(default)]
    pub cupping_attributes: CuppingConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taint_fault_configuration: Option<TaintFaultConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_region_configuration: Option<MicroRegionConfiguration>,
}

/// Root aggregate. Owns every configuration object by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawQualityTemplate")]
pub struct QualityTemplate {
    pub id: Uuid,
    /// Locale tag to display name.
    pub names: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
    pub origin: String,
    pub version: u32,
    pub parameters: TemplateParameters,
    pub is_active: bool,
    pub sharing: SharingScope,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

/// Wire shape of a template. Older payloads carry `is_global` and `laboratory_ids` at the top
/// level instead of a `sharing` object.
#[derive(Debug, Deserialize)]
struct RawQualityTemplate {
    id: Uuid,
    #[serde(default)]
    names: BTreeMap<String, String>,
    #[serde(default)]
    descriptions: BTreeMap<String, String>,
    origin: String,
    version: u32,
    #[serde(default)]
    parameters: TemplateParameters,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    sharing: Option<SharingScope>,
    #[serde(default)]
    is_global: Option<bool>,
    #[serde(default)]
    laboratory_ids: Option<Vec<LaboratoryId>>,
    created_by: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

impl TryFrom<RawQualityTemplate> for QualityTemplate {
    type Error = SharingScopeError;

    fn try_from(raw: RawQualityTemplate) -> Result<Self, Self::Error> {
        let has_legacy_flags = raw.is_global.is_some() || raw.laboratory_ids.is_some();
        let sharing = match raw.sharing {
            Some(sharing) if has_legacy_flags => {
                let legacy = SharingScope::from_flags(
                    raw.is_global.unwrap_or(false),
                    raw.laboratory_ids.unwrap_or_default(),
                )?;
                if legacy != sharing {
                    return Err(SharingScopeError::ConflictingShapes);
                }
                sharing
            }
            Some(sharing) => sharing,
            None => SharingScope::from_flags(
                raw.is_global.unwrap_or(false),
                raw.laboratory_ids.unwrap_or_default(),
            )?,
        };

        Ok(Self {
            id: raw.id,
            names: raw.names,
            descriptions: raw.descriptions,
            origin: raw.origin,
            version: raw.version,
            parameters: raw.parameters,
            is_active: raw.is_active,
            sharing,
            created_by: raw.created_by,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        })
    }
}

impl QualityTemplate {
    /// Unsaved first version with empty parameters, private to its author.
    pub fn draft(origin: impl Into<String>, created_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            names: BTreeMap::new(),
            descriptions: BTreeMap::new(),
            origin: origin.into(),
            version: 1,
            parameters: TemplateParameters::default(),
            is_active: true,
            sharing: SharingScope::Private,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(locale.into(), name.into());
        self
    }

    pub fn has_name(&self) -> bool {
        self.names.values().any(|name| !name.trim().is_empty())
    }

    /// Name for `locale`, falling back to the first non-empty name in any locale.
    pub fn display_name(&self, locale: &str) -> Option<&str> {
        self.names
            .get(locale)
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.names.values().find(|name| !name.trim().is_empty()))
            .map(String::as_str)
    }
}

/// Snapshot appended to the version history each time a template is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRevision {
    pub template_id: Uuid,
    pub version: u32,
    pub names: BTreeMap<String, String>,
    pub parameters: TemplateParameters,
    pub saved_by: String,
    pub saved_at: DateTime<Utc>,
}

impl TemplateRevision {
    pub fn of(template: &QualityTemplate, saved_by: impl Into<String>) -> Self {
        Self {
            template_id: template.id,
            version: template.version,
            names: template.names.clone(),
            parameters: template.parameters.clone(),
            saved_by: saved_by.into(),
            saved_at: template.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab(id: &str) -> LaboratoryId {
        LaboratoryId(id.to_string())
    }

    #[test]
    fn flags_map_onto_exactly_one_scope() {
        assert_eq!(
            SharingScope::from_flags(true, Vec::new()),
            Ok(SharingScope::Global)
        );
        assert_eq!(
            SharingScope::from_flags(false, Vec::new()),
            Ok(SharingScope::Private)
        );
        assert_eq!(
            SharingScope::from_flags(false, vec![lab("lab-sp")]),
            Ok(SharingScope::Laboratories {
                laboratory_ids: vec![lab("lab-sp")]
            })
        );
        assert_eq!(
            SharingScope::from_flags(true, vec![lab("lab-sp"), lab("lab-mg")]),
            Err(SharingScopeError::GlobalWithLaboratories(2))
        );
    }

    #[test]
    fn assigning_laboratories_leaves_global_sharing() {
        let mut scope = SharingScope::Global;
        scope.assign_laboratories(vec![lab("lab-sp")]);
        assert!(!scope.is_global());
        assert_eq!(scope.laboratory_ids(), &[lab("lab-sp")]);

        scope.make_global();
        assert!(scope.laboratory_ids().is_empty());

        scope.assign_laboratories(Vec::new());
        assert_eq!(scope, SharingScope::Private);
    }

    #[test]
    fn laboratory_scope_needs_distinct_members() {
        let empty = SharingScope::Laboratories {
            laboratory_ids: Vec::new(),
        };
        assert_eq!(empty.validate(), Err(SharingScopeError::NoLaboratories));

        let repeated = SharingScope::Laboratories {
            laboratory_ids: vec![lab("lab-sp"), lab("lab-sp")],
        };
        assert_eq!(
            repeated.validate(),
            Err(SharingScopeError::DuplicateLaboratory("lab-sp".to_string()))
        );
    }

    #[test]
    fn scope_serializes_with_tag() {
        let scope = SharingScope::Laboratories {
            laboratory_ids: vec![lab("lab-sp")],
        };
        assert_eq!(
            serde_json::to_value(&scope).expect("serialize"),
            serde_json::json!({ "scope": "laboratories", "laboratory_ids": ["lab-sp"] })
        );
        assert_eq!(
            serde_json::to_value(SharingScope::Global).expect("serialize"),
            serde_json::json!({ "scope": "global" })
        );
    }

    fn decode(value: serde_json::Value) -> Result<QualityTemplate, serde_json::Error> {
        let mut payload = serde_json::json!({
            "id": "7d4a2e10-3b9c-4f21-8e5d-6a7b8c9d0e1f",
            "names": { "en": "Minimal" },
            "origin": "Brazil",
            "version": 1,
            "created_by": "user-1"
        });
        if let (Some(target), Some(extra)) = (payload.as_object_mut(), value.as_object()) {
            target.extend(extra.clone());
        }
        serde_json::from_value(payload)
    }

    #[test]
    fn global_scope_with_laboratories_does_not_decode() {
        let err = decode(serde_json::json!({
            "sharing": { "scope": "global", "laboratory_ids": ["lab-a", "lab-b"] }
        }))
        .expect_err("contradictory scope");
        assert!(err.to_string().contains("global"), "{err}");

        assert!(decode(serde_json::json!({
            "sharing": { "scope": "private", "laboratory_ids": ["lab-a"] }
        }))
        .is_err());
        assert!(decode(serde_json::json!({
            "sharing": { "scope": "global", "colour": "blue" }
        }))
        .is_err());
    }

    #[test]
    fn legacy_flags_go_through_the_same_rules() {
        assert!(decode(serde_json::json!({
            "is_global": true,
            "laboratory_ids": ["lab-a"]
        }))
        .is_err());

        let shared = decode(serde_json::json!({
            "is_global": false,
            "laboratory_ids": ["lab-a"]
        }))
        .expect("legacy laboratory sharing");
        assert_eq!(shared.sharing.laboratory_ids(), &[lab("lab-a")]);

        let global = decode(serde_json::json!({ "is_global": true })).expect("legacy global");
        assert!(global.sharing.is_global());

        assert!(decode(serde_json::json!({
            "sharing": { "scope": "private" },
            "is_global": true
        }))
        .is_err());
    }

    #[test]
    fn encoded_template_decodes_to_itself() {
        let mut template = QualityTemplate::draft("Brazil", "user-1").with_name("en", "Round trip");
        template.sharing.assign_laboratories(vec![lab("lab-sp")]);

        let encoded = serde_json::to_value(&template).expect("serialize");
        let decoded: QualityTemplate = serde_json::from_value(encoded).expect("deserialize");

        assert_eq!(decoded, template);
    }

    #[test]
    fn display_name_falls_back_to_any_locale() {
        let template = QualityTemplate::draft("Brazil", "user-1").with_name("pt-BR", "Padrão");
        assert_eq!(template.display_name("en"), Some("Padrão"));
        assert!(template.has_name());
        assert!(!QualityTemplate::draft("Brazil", "user-1").has_name());
    }
}
