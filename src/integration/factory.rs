//! Integration factory

use std::sync::Arc;

use crate::config::GraphConfig;

use super::graph::GraphClient;
use super::memory::{
    MemoryFieldResolver, MemoryFlowResolver, MemoryMediaUploader, MemoryTemplateSubmitter,
};
use super::traits::{FieldResolver, FlowResolver, MediaUploader, TemplateSubmitter};

/// The set of collaborators the template service talks to.
#[derive(Clone)]
pub struct Integrations {
    pub fields: Arc<dyn FieldResolver>,
    pub media: Arc<dyn MediaUploader>,
    pub submitter: Arc<dyn TemplateSubmitter>,
    pub flows: Arc<dyn FlowResolver>,
}

impl Integrations {
    /// All collaborators backed by memory.
    pub fn in_memory() -> Self {
        Self {
            fields: Arc::new(MemoryFieldResolver::new()),
            media: Arc::new(MemoryMediaUploader::new()),
            submitter: Arc::new(MemoryTemplateSubmitter::new()),
            flows: Arc::new(MemoryFlowResolver::new()),
        }
    }
}

/// Create integrations based on configuration.
///
/// A configured access token selects the Graph API for media, submission and
/// flows. Record lookups have no Graph counterpart and stay in memory.
/// Without a token, or if the client cannot be built, everything falls back
/// to memory.
pub fn create_integrations(config: &GraphConfig) -> Integrations {
    if !config.is_configured() {
        tracing::warn!("No Graph API access token configured, using in-memory integrations");
        return Integrations::in_memory();
    }

    match GraphClient::new(config.clone()) {
        Ok(client) => {
            let client = Arc::new(client);
            tracing::info!(
                business_account_id = %config.business_account_id,
                "Using Graph API integrations"
            );
            Integrations {
                fields: Arc::new(MemoryFieldResolver::new()),
                media: client.clone(),
                submitter: client.clone(),
                flows: client,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build Graph API client, falling back to memory");
            Integrations::in_memory()
        }
    }
}
