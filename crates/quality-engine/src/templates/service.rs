use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::template::{QualityTemplate, TemplateRevision};
use super::validator::{TemplateValidator, ValidatorSettings};

/// Storage abstraction for whole templates. The engine never issues partial updates.
pub trait TemplateStore: Send + Sync {
    fn fetch(&self, id: Uuid) -> Result<Option<QualityTemplate>, StoreError>;
    fn put(&self, template: QualityTemplate) -> Result<(), StoreError>;
    fn remove(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Append-only log of saved versions.
pub trait VersionHistory: Send + Sync {
    fn append(&self, revision: TemplateRevision) -> Result<(), StoreError>;
    fn revisions(&self, template_id: Uuid) -> Result<Vec<TemplateRevision>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("template already exists")]
    Conflict,
    #[error("template not found")]
    NotFound,
    #[error("template store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateServiceError {
    #[error("template failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A stored version plus the soft warnings raised while validating it.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTemplate {
    pub template: QualityTemplate,
    pub warnings: Vec<String>,
}

/// Validates templates before handing them to the persistence collaborators.
pub struct TemplateService<S, H> {
    store: Arc<S>,
    history: Arc<H>,
    validator: TemplateValidator,
}

impl<S, H> TemplateService<S, H>
where
    S: TemplateStore + 'static,
    H: VersionHistory + 'static,
{
    pub fn new(store: Arc<S>, history: Arc<H>, settings: ValidatorSettings) -> Self {
        Self {
            store,
            history,
            validator: TemplateValidator::new(settings),
        }
    }

    /// Store a brand-new template as version 1.
    pub fn create(
        &self,
        mut template: QualityTemplate,
    ) -> Result<SavedTemplate, TemplateServiceError> {
        if self.store.fetch(template.id)?.is_some() {
            return Err(StoreError::Conflict.into());
        }

        let now = Utc::now();
        template.version = 1;
        template.created_at = now;
        template.updated_at = now;
        let author = template.created_by.clone();
        self.persist(template, None, &author)
    }

    /// Store an edited template as the next version. The previous version stays untouched in
    /// the history.
    pub fn save(
        &self,
        mut template: QualityTemplate,
        editor: &str,
    ) -> Result<SavedTemplate, TemplateServiceError> {
        let previous = self
            .store
            .fetch(template.id)?
            .ok_or(StoreError::NotFound)?;

        template.version = previous.version.saturating_add(1);
        template.created_by = previous.created_by.clone();
        template.created_at = previous.created_at;
        template.updated_at = Utc::now();
        self.persist(template, Some(previous), editor)
    }

    pub fn get(&self, id: Uuid) -> Result<QualityTemplate, TemplateServiceError> {
        let template = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        Ok(template)
    }

    pub fn revisions(&self, id: Uuid) -> Result<Vec<TemplateRevision>, TemplateServiceError> {
        Ok(self.history.revisions(id)?)
    }

    /// Store the new version and record it in the history. When the history refuses the
    /// revision, the store is put back to `previous`.
    fn persist(
        &self,
        template: QualityTemplate,
        previous: Option<QualityTemplate>,
        saved_by: &str,
    ) -> Result<SavedTemplate, TemplateServiceError> {
        let validation = self.validator.validate(&template);
        if !validation.is_valid() {
            warn!(
                template_id = %template.id,
                errors = validation.errors.len(),
                "rejected invalid quality template"
            );
            return Err(TemplateServiceError::Invalid(validation.errors));
        }

        let revision = TemplateRevision::of(&template, saved_by);
        self.store.put(template.clone())?;
        if let Err(err) = self.history.append(revision) {
            self.roll_back(template.id, previous);
            return Err(err.into());
        }

        info!(
            template_id = %template.id,
            version = template.version,
            saved_by,
            "saved quality template"
        );
        Ok(SavedTemplate {
            template,
            warnings: validation.warnings,
        })
    }

    fn roll_back(&self, id: Uuid, previous: Option<QualityTemplate>) {
        let restored = match previous {
            Some(previous) => self.store.put(previous),
            None => self.store.remove(id),
        };
        if let Err(err) = restored {
            warn!(template_id = %id, error = %err, "failed to roll back template after history error");
        }
    }
}
