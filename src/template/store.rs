//! Draft storage with CRUD operations

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use super::types::{TemplateDraft, TemplateError, TemplateResult};

/// Where a stored draft is in the submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    Submitted {
        template_id: String,
        vendor_status: String,
    },
    Rejected {
        reason: String,
    },
}

/// A draft held by the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDraft {
    pub id: Uuid,
    pub draft: TemplateDraft,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory draft storage
pub struct DraftStore {
    drafts: DashMap<Uuid, StoredDraft>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore {
    /// Create a new draft store
    pub fn new() -> Self {
        Self {
            drafts: DashMap::new(),
        }
    }

    /// Store a new draft
    pub fn create(&self, draft: TemplateDraft) -> StoredDraft {
        let now = Utc::now();
        let stored = StoredDraft {
            id: Uuid::new_v4(),
            draft,
            status: DraftStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        tracing::debug!(draft_id = %stored.id, template = %stored.draft.name, "Draft created");
        self.drafts.insert(stored.id, stored.clone());
        stored
    }

    /// Get a draft by ID
    pub fn get(&self, id: Uuid) -> TemplateResult<StoredDraft> {
        self.drafts
            .get(&id)
            .map(|d| d.clone())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// List all drafts, oldest first
    pub fn list(&self) -> Vec<StoredDraft> {
        let mut drafts: Vec<_> = self
            .drafts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        drafts.sort_by_key(|d| (d.created_at, d.id));
        drafts
    }

    /// Replace the draft content. Editing puts the entry back into `Draft`.
    pub fn update(&self, id: Uuid, draft: TemplateDraft) -> TemplateResult<StoredDraft> {
        self.apply(id, |_| Ok(draft))
    }

    /// Run a draft transition against the stored draft.
    ///
    /// The stored value is only replaced when the transition succeeds.
    pub fn apply<F>(&self, id: Uuid, transition: F) -> TemplateResult<StoredDraft>
    where
        F: FnOnce(TemplateDraft) -> TemplateResult<TemplateDraft>,
    {
        let mut entry = self
            .drafts
            .get_mut(&id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;

        let next = transition(entry.draft.clone())?;
        entry.draft = next;
        entry.status = DraftStatus::Draft;
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    /// Record a successful submission
    pub fn mark_submitted(
        &self,
        id: Uuid,
        template_id: &str,
        vendor_status: &str,
    ) -> TemplateResult<StoredDraft> {
        self.set_status(
            id,
            DraftStatus::Submitted {
                template_id: template_id.to_string(),
                vendor_status: vendor_status.to_string(),
            },
        )
    }

    /// Record a vendor rejection; the draft itself is kept for a retry
    pub fn mark_rejected(&self, id: Uuid, reason: &str) -> TemplateResult<StoredDraft> {
        self.set_status(
            id,
            DraftStatus::Rejected {
                reason: reason.to_string(),
            },
        )
    }

    fn set_status(&self, id: Uuid, status: DraftStatus) -> TemplateResult<StoredDraft> {
        let mut entry = self
            .drafts
            .get_mut(&id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        entry.status = status;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    /// Delete a draft by ID
    pub fn delete(&self, id: Uuid) -> TemplateResult<()> {
        self.drafts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// Check if a draft exists
    pub fn exists(&self, id: Uuid) -> bool {
        self.drafts.contains_key(&id)
    }

    /// Get the number of drafts
    pub fn count(&self) -> usize {
        self.drafts.len()
    }
}

/// Create an Arc-wrapped draft store
pub fn create_draft_store() -> Arc<DraftStore> {
    Arc::new(DraftStore::new())
}
