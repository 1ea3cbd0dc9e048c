//! Template service: drafts plus the remote collaborators.
//!
//! Every operation reads the stored draft, works on a copy and only writes
//! back on success. Vendor failures change the status flag and nothing else.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::integration::{IntegrationError, Integrations, MediaFile, SubmittedTemplate};
use crate::metrics::{MediaMetrics, SubmissionMetrics, TemplateMetrics};
use crate::template::{
    build, Button, DraftStore, FieldValues, Header, Preview, PreviewRenderer, StoredDraft,
    TemplateDraft, TemplateError, TemplateSection, VendorPayload, DEFAULT_MESSAGE_TTL_SECONDS,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub draft: StoredDraft,
    pub template: SubmittedTemplate,
}

pub struct TemplateService {
    store: Arc<DraftStore>,
    integrations: Integrations,
    renderer: PreviewRenderer,
    default_ttl_seconds: u32,
}

impl TemplateService {
    pub fn new(store: Arc<DraftStore>, integrations: Integrations, escape_html: bool) -> Self {
        Self {
            store,
            integrations,
            renderer: PreviewRenderer::new(escape_html),
            default_ttl_seconds: DEFAULT_MESSAGE_TTL_SECONDS,
        }
    }

    /// TTL applied to drafts that do not set `expire_seconds`.
    pub fn with_default_ttl(mut self, seconds: u32) -> Self {
        self.default_ttl_seconds = seconds;
        self
    }

    /// Copy of the draft with the configured TTL filled in.
    fn effective(&self, draft: &TemplateDraft) -> TemplateDraft {
        let mut draft = draft.clone();
        draft.expire_seconds.get_or_insert(self.default_ttl_seconds);
        draft
    }

    pub fn store(&self) -> &Arc<DraftStore> {
        &self.store
    }

    pub fn create(&self, draft: TemplateDraft) -> StoredDraft {
        let stored = self.store.create(draft);
        TemplateMetrics::set_drafts_stored(self.store.count());
        stored
    }

    /// Store a draft rebuilt from a template already held by the vendor.
    pub fn import(&self, vendor_template: &serde_json::Value) -> ServiceResult<StoredDraft> {
        let draft = TemplateDraft::from_vendor(vendor_template)?;
        tracing::info!(template = %draft.name, "Imported vendor template");
        Ok(self.create(draft))
    }

    pub fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.store.delete(id)?;
        TemplateMetrics::set_drafts_stored(self.store.count());
        Ok(())
    }

    /// Build the vendor payload, reporting every validation error at once.
    pub fn build_payload(&self, id: Uuid) -> ServiceResult<VendorPayload> {
        let stored = self.store.get(id)?;
        build_checked(&self.effective(&stored.draft))
    }

    /// Render the preview, resolving live values from `record_id` if given.
    pub async fn preview(&self, id: Uuid, record_id: Option<&str>) -> ServiceResult<Preview> {
        let stored = self.store.get(id)?;

        let values = match record_id {
            Some(record_id) => Some(self.resolve_values(&stored.draft, record_id).await?),
            None => None,
        };

        TemplateMetrics::record_preview();
        Ok(self
            .renderer
            .render(&self.effective(&stored.draft), values.as_ref()))
    }

    async fn resolve_values(
        &self,
        draft: &TemplateDraft,
        record_id: &str,
    ) -> ServiceResult<FieldValues> {
        let mut values = FieldValues::new();
        let variables = draft
            .variables(TemplateSection::Header)
            .iter()
            .chain(draft.variables(TemplateSection::Body));

        for variable in variables.filter(|v| v.is_bound()) {
            let key = variable.binding_key();
            if values.contains_key(&key) {
                continue;
            }
            let value = self
                .integrations
                .fields
                .fetch_field_value(&variable.object, &variable.field, record_id)
                .await?;
            // missing values fall back to alternate text during substitution
            if let Some(value) = value {
                values.insert(key, value);
            }
        }

        Ok(values)
    }

    /// Upload header media and store the returned handle on the draft.
    pub async fn attach_media(&self, id: Uuid, file: MediaFile) -> ServiceResult<StoredDraft> {
        let stored = self.store.get(id)?;
        let format = stored.draft.header.format;
        if !format.is_media() {
            return Err(TemplateError::InvalidTemplate(format!(
                "header format {format} does not take media"
            ))
            .into());
        }

        let handle = match self.integrations.media.upload_media(file).await {
            Ok(handle) => {
                MediaMetrics::record_upload(true);
                handle
            }
            Err(e) => {
                MediaMetrics::record_upload(false);
                tracing::warn!(draft_id = %id, error = %e, "Media upload failed");
                return Err(e.into());
            }
        };

        tracing::info!(draft_id = %id, handle = %handle, "Header media attached");
        let updated = self
            .store
            .apply(id, |draft| Ok(draft.with_header(Header::media(format, Some(handle)))))?;
        Ok(updated)
    }

    /// Validate, resolve flows, submit, then record the outcome.
    pub async fn submit(&self, id: Uuid) -> ServiceResult<SubmitOutcome> {
        let stored = self.store.get(id)?;
        let payload = build_checked(&self.effective(&stored.draft))?;

        for button in &stored.draft.buttons {
            if let Button::Flow {
                flow_id: Some(flow_id),
                ..
            } = button
            {
                let flow = self.integrations.flows.resolve_flow(flow_id).await?;
                tracing::debug!(flow_id = %flow.id, status = %flow.status, "Flow resolved");
            }
        }

        match self.integrations.submitter.submit_template(&payload).await {
            Ok(template) => {
                SubmissionMetrics::record_accepted();
                tracing::info!(
                    draft_id = %id,
                    template = %payload.name,
                    template_id = %template.id,
                    status = %template.status,
                    "Template submitted"
                );
                let draft = self.store.mark_submitted(id, &template.id, &template.status)?;
                Ok(SubmitOutcome { draft, template })
            }
            Err(IntegrationError::Rejected { message, code }) => {
                SubmissionMetrics::record_rejected();
                tracing::warn!(
                    draft_id = %id,
                    template = %payload.name,
                    code = ?code,
                    reason = %message,
                    "Template rejected"
                );
                self.store.mark_rejected(id, &message)?;
                Err(IntegrationError::Rejected { message, code }.into())
            }
            Err(e) => {
                SubmissionMetrics::record_error();
                tracing::error!(draft_id = %id, error = %e, "Template submission failed");
                Err(e.into())
            }
        }
    }
}

fn build_checked(draft: &TemplateDraft) -> ServiceResult<VendorPayload> {
    match build(draft) {
        Ok(payload) => {
            TemplateMetrics::record_payload_built();
            Ok(payload)
        }
        Err(errors) => {
            TemplateMetrics::record_validation_errors(&errors);
            tracing::debug!(
                template = %draft.name,
                errors = errors.len(),
                "Draft failed validation"
            );
            Err(TemplateError::Validation(errors).into())
        }
    }
}
