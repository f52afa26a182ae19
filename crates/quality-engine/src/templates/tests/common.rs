use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::templates::aspect::AspectConfiguration;
use crate::templates::cupping::{CuppingAttribute, CuppingConfiguration};
use crate::templates::defects::{DefectCategory, DefectConfiguration, DefectThresholds};
use crate::templates::presets;
use crate::templates::scale::{Scale, ValidationRule};
use crate::templates::screen_size::{ScreenSizeConstraint, ScreenSizeRequirements};
use crate::templates::service::{StoreError, TemplateService, TemplateStore, VersionHistory};
use crate::templates::taint_fault::{TaintFaultConfiguration, TaintFaultDefinition};
use crate::templates::template::{
    LaboratoryId, QualityTemplate, SharingScope, TemplateParameters, TemplateRevision,
};
use crate::templates::validator::ValidatorSettings;

pub(super) const TOLERANCE: f64 = 1e-6;

/// Blue-Green (9) and Fine (6), with Blue-Green as the minimum acceptable grade.
pub(super) fn green_aspect() -> AspectConfiguration {
    let mut config = AspectConfiguration::default();
    config
        .add_wording("Blue-Green", 9.0, None)
        .expect("first wording");
    config.add_wording("Fine", 6.0, None).expect("second wording");
    config
        .set_min_acceptable(9.0, Some("Colour below Blue-Green".to_string()))
        .expect("threshold targets a wording");
    config
}

pub(super) fn screen_sizes() -> ScreenSizeRequirements {
    ScreenSizeRequirements::new(vec![
        ScreenSizeConstraint::minimum("Screen 17/18", 50.0),
        ScreenSizeConstraint::range("Screen 16", 10.0, 40.0),
        ScreenSizeConstraint::maximum("Screen 13 and below", 5.0),
    ])
}

pub(super) fn cupping() -> CuppingConfiguration {
    CuppingConfiguration::new(vec![
        CuppingAttribute::new("Flavor", Scale::numeric(6.0, 10.0, 0.25))
            .required()
            .with_rule(ValidationRule::Minimum { value: 7.0 }),
        CuppingAttribute::new("Body", Scale::numeric(6.0, 10.0, 0.25)),
    ])
}

/// Two primary defects of weight 1.0 and a primary threshold of 1.
pub(super) fn defects() -> DefectConfiguration {
    let mut config = DefectConfiguration::default();
    config
        .add_defect("Full Black", DefectCategory::Primary, 1.0)
        .expect("first primary");
    config
        .add_defect("Full Sour", DefectCategory::Primary, 1.0)
        .expect("second primary");
    config
        .add_defect("Broken", DefectCategory::Secondary, 0.2)
        .expect("secondary");
    config.set_thresholds(DefectThresholds {
        max_primary: Some(1),
        max_secondary: None,
        max_total: None,
    });
    config
}

pub(super) fn taint_faults() -> TaintFaultConfiguration {
    let mut config = TaintFaultConfiguration::default();
    config
        .add_taint(TaintFaultDefinition::new(
            "Earthy",
            Scale::numeric(0.0, 3.0, 1.0),
        ))
        .expect("taint");
    config
        .add_fault(TaintFaultDefinition::new(
            "Rioy",
            Scale::numeric(0.0, 5.0, 1.0),
        ))
        .expect("fault");
    config.rules.max_taints = Some(2);
    config.rules.max_faults = Some(1);
    config
}

pub(super) fn complete_template() -> QualityTemplate {
    let mut template =
        QualityTemplate::draft("Brazil", "user-42").with_name("en", "Cerrado specialty export");
    template.sharing = SharingScope::Laboratories {
        laboratory_ids: vec![LaboratoryId("lab-santos".to_string())],
    };
    template.parameters = TemplateParameters {
        sample_size_grams: Some(300.0),
        screen_size_requirements: screen_sizes(),
        green_aspect_configuration: Some(green_aspect()),
        defect_configuration: Some(defects()),
        moisture_min: Some(10.0),
        moisture_max: Some(12.5),
        moisture_standard: "ISO 6673".to_string(),
        roast_aspect_configuration: presets::aspect_preset("roast_standard"),
        roast_sample_size_grams: Some(100.0),
        max_quakers: Some(3),
        cupping_attributes: cupping(),
        taint_fault_configuration: Some(taint_faults()),
        micro_region_configuration: None,
    };
    template
}

#[derive(Default)]
pub(super) struct MemoryStore {
    templates: Mutex<HashMap<Uuid, QualityTemplate>>,
}

impl TemplateStore for MemoryStore {
    fn fetch(&self, id: Uuid) -> Result<Option<QualityTemplate>, StoreError> {
        let guard = self.templates.lock().expect("store mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn put(&self, template: QualityTemplate) -> Result<(), StoreError> {
        let mut guard = self.templates.lock().expect("store mutex poisoned");
        guard.insert(template.id, template);
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.templates.lock().expect("store mutex poisoned");
        guard.remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    revisions: Mutex<Vec<TemplateRevision>>,
}

impl VersionHistory for MemoryHistory {
    fn append(&self, revision: TemplateRevision) -> Result<(), StoreError> {
        self.revisions
            .lock()
            .expect("history mutex poisoned")
            .push(revision);
        Ok(())
    }

    fn revisions(&self, template_id: Uuid) -> Result<Vec<TemplateRevision>, StoreError> {
        let guard = self.revisions.lock().expect("history mutex poisoned");
        Ok(guard
            .iter()
            .filter(|revision| revision.template_id == template_id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableStore;

impl TemplateStore for UnavailableStore {
    fn fetch(&self, _id: Uuid) -> Result<Option<QualityTemplate>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn put(&self, _template: QualityTemplate) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct FailingHistory;

impl VersionHistory for FailingHistory {
    fn append(&self, _revision: TemplateRevision) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("history offline".to_string()))
    }

    fn revisions(&self, _template_id: Uuid) -> Result<Vec<TemplateRevision>, StoreError> {
        Err(StoreError::Unavailable("history offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    TemplateService<MemoryStore, MemoryHistory>,
    Arc<MemoryStore>,
    Arc<MemoryHistory>,
) {
    let store = Arc::new(MemoryStore::default());
    let history = Arc::new(MemoryHistory::default());
    let service = TemplateService::new(store.clone(), history.clone(), ValidatorSettings::default());
    (service, store, history)
}
