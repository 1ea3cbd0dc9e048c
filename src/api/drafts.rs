//! Draft endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::integration::{MediaFile, SubmittedTemplate};
use crate::pagination::{paginate, Page, PageQuery};
use crate::server::AppState;
use crate::template::{
    Button, Preview, StoredDraft, TemplateDraft, TemplateSection, VendorPayload,
};

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    /// Record to resolve live values from; alternate text is used without one
    #[serde(default)]
    pub record_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddVariableRequest {
    pub section: TemplateSection,
    pub object: String,
    pub field: String,
    #[serde(default)]
    pub alternate_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub file_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub draft: StoredDraft,
    pub template: SubmittedTemplate,
}

/// POST /api/v1/drafts - Store a new draft
#[tracing::instrument(
    name = "http.create_draft",
    skip(state, draft),
    fields(template = %draft.name)
)]
pub async fn create_draft(
    State(state): State<AppState>,
    Json(draft): Json<TemplateDraft>,
) -> (StatusCode, Json<StoredDraft>) {
    (StatusCode::CREATED, Json(state.service.create(draft)))
}

/// POST /api/v1/drafts/import - Hydrate a draft from a vendor template
#[tracing::instrument(name = "http.import_draft", skip(state, body))]
pub async fn import_draft(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<StoredDraft>)> {
    let stored = state.service.import(&body)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/v1/drafts - List drafts, oldest first
#[tracing::instrument(name = "http.list_drafts", skip(state))]
pub async fn list_drafts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<Page<StoredDraft>> {
    let templates = &state.settings.templates;
    let (page, page_size) = query.resolve(templates.default_page_size, templates.max_page_size);

    let drafts = state.service.store().list();
    Json(paginate(&drafts, page, page_size))
}

/// GET /api/v1/drafts/{id}
#[tracing::instrument(name = "http.get_draft", skip(state))]
pub async fn get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredDraft>> {
    Ok(Json(state.service.store().get(id)?))
}

/// PUT /api/v1/drafts/{id} - Replace the draft content
#[tracing::instrument(name = "http.update_draft", skip(state, draft))]
pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<TemplateDraft>,
) -> Result<Json<StoredDraft>> {
    Ok(Json(state.service.store().update(id, draft)?))
}

/// DELETE /api/v1/drafts/{id}
#[tracing::instrument(name = "http.delete_draft", skip(state))]
pub async fn delete_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/drafts/{id}/payload - Build the vendor payload
#[tracing::instrument(name = "http.build_payload", skip(state))]
pub async fn build_payload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorPayload>> {
    Ok(Json(state.service.build_payload(id)?))
}

/// POST /api/v1/drafts/{id}/preview
///
/// The body is optional; without one every variable renders its alternate text.
#[tracing::instrument(name = "http.preview", skip(state, body))]
pub async fn preview_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Preview>> {
    let request: PreviewRequest = if body.is_empty() {
        PreviewRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid preview request: {e}")))?
    };
    let preview = state
        .service
        .preview(id, request.record_id.as_deref())
        .await?;
    Ok(Json(preview))
}

/// POST /api/v1/drafts/{id}/variables - Bind a new variable
#[tracing::instrument(name = "http.add_variable", skip(state, request))]
pub async fn add_variable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddVariableRequest>,
) -> Result<Json<StoredDraft>> {
    let stored = state.service.store().apply(id, |draft| {
        draft.add_variable(
            request.section,
            &request.object,
            &request.field,
            request.alternate_text,
        )
    })?;
    Ok(Json(stored))
}

/// DELETE /api/v1/drafts/{id}/variables/{section}/{index}
#[tracing::instrument(name = "http.remove_variable", skip(state))]
pub async fn remove_variable(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, TemplateSection, u32)>,
) -> Result<Json<StoredDraft>> {
    let stored = state
        .service
        .store()
        .apply(id, |draft| draft.remove_variable(section, index))?;
    Ok(Json(stored))
}

/// POST /api/v1/drafts/{id}/buttons - Append a button
#[tracing::instrument(name = "http.add_button", skip(state, button))]
pub async fn add_button(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(button): Json<Button>,
) -> Result<Json<StoredDraft>> {
    let stored = state
        .service
        .store()
        .apply(id, |draft| draft.add_button(button))?;
    Ok(Json(stored))
}

/// DELETE /api/v1/drafts/{id}/buttons/{position}
#[tracing::instrument(name = "http.remove_button", skip(state))]
pub async fn remove_button(
    State(state): State<AppState>,
    Path((id, position)): Path<(Uuid, usize)>,
) -> Result<Json<StoredDraft>> {
    let stored = state
        .service
        .store()
        .apply(id, |draft| draft.remove_button(position))?;
    Ok(Json(stored))
}

/// POST /api/v1/drafts/{id}/media - Upload header media from the raw body
#[tracing::instrument(name = "http.attach_media", skip(state, headers, body))]
pub async fn attach_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MediaQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StoredDraft>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Media body is empty".to_string()));
    }

    let mime_type = query
        .mime_type
        .or_else(|| {
            headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let file = MediaFile {
        file_name: query.file_name,
        mime_type,
        bytes: body.to_vec(),
    };
    Ok(Json(state.service.attach_media(id, file).await?))
}

/// POST /api/v1/drafts/{id}/submit - Submit for vendor review
#[tracing::instrument(name = "http.submit", skip(state))]
pub async fn submit_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponse>> {
    let outcome = state.service.submit(id).await?;
    Ok(Json(SubmitResponse {
        draft: outcome.draft,
        template: outcome.template,
    }))
}
