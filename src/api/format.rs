//! Stand-alone text formatting.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::server::AppState;
use crate::template::{format_text, format_text_unescaped};

#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    pub text: String,
    /// Overrides `templates.escape_html`
    #[serde(default)]
    pub escape_html: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct FormatResponse {
    pub html: String,
}

/// POST /api/v1/format - Render WhatsApp markup as HTML
#[tracing::instrument(name = "http.format", skip(state, request))]
pub async fn format(
    State(state): State<AppState>,
    Json(request): Json<FormatRequest>,
) -> Json<FormatResponse> {
    let escape = request
        .escape_html
        .unwrap_or(state.settings.templates.escape_html);

    let html = if escape {
        format_text(&request.text)
    } else {
        format_text_unescaped(&request.text)
    };
    Json(FormatResponse { html })
}
