use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::integration::{create_integrations, Integrations};
use crate::service::TemplateService;
use crate::template::create_draft_store;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub service: Arc<TemplateService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let integrations = create_integrations(&settings.graph);
        Self::with_integrations(settings, integrations)
    }

    /// Build state around explicit collaborators.
    pub fn with_integrations(settings: Settings, integrations: Integrations) -> Self {
        let service = Arc::new(
            TemplateService::new(
                create_draft_store(),
                integrations,
                settings.templates.escape_html,
            )
            .with_default_ttl(settings.templates.default_message_ttl_seconds),
        );

        Self {
            settings: Arc::new(settings),
            service,
            start_time: Instant::now(),
        }
    }
}
