use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::server::AppState;

use super::drafts::{
    add_button, add_variable, attach_media, build_payload, create_draft, delete_draft, get_draft,
    import_draft, list_drafts, preview_draft, remove_button, remove_variable, submit_draft,
    update_draft,
};
use super::format::format;
use super::health::health;
use super::metrics::prometheus_metrics;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                .route("/format", post(format))
                // Drafts
                .route("/drafts", post(create_draft).get(list_drafts))
                .route("/drafts/import", post(import_draft))
                .route(
                    "/drafts/{id}",
                    get(get_draft).put(update_draft).delete(delete_draft),
                )
                // Variables & buttons
                .route("/drafts/{id}/variables", post(add_variable))
                .route(
                    "/drafts/{id}/variables/{section}/{index}",
                    delete(remove_variable),
                )
                .route("/drafts/{id}/buttons", post(add_button))
                .route("/drafts/{id}/buttons/{position}", delete(remove_button))
                // Rendering & vendor
                .route("/drafts/{id}/payload", post(build_payload))
                .route("/drafts/{id}/preview", post(preview_draft))
                .route("/drafts/{id}/media", post(attach_media))
                .route("/drafts/{id}/submit", post(submit_draft)),
        )
}
