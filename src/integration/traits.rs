//! Collaborator traits for everything the template core does not own.
//!
//! Record lookups, media uploads, template submission and flow lookups live
//! behind these traits so the core never assumes a particular host platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::VendorPayload;

/// Errors raised by remote collaborators.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// The vendor refused the submission
    #[error("Template rejected by vendor: {message}")]
    Rejected { message: String, code: Option<i64> },

    #[error("Media upload failed: {0}")]
    Upload(String),

    #[error("Flow not found: {0}")]
    FlowNotFound(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Integration not configured: {0}")]
    NotConfigured(String),

    #[error("Unexpected vendor response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Vendor error envelope: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorErrorEnvelope {
    pub error: VendorErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VendorErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_user_title: Option<String>,
    #[serde(default)]
    pub error_user_msg: Option<String>,
}

impl VendorErrorBody {
    /// Message meant for end users, falling back to the technical one.
    pub fn user_message(&self) -> String {
        self.error_user_msg
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.message.clone())
    }
}

/// A file to upload as header media.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTemplate {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: String,
}

/// A flow that can back a FLOW button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Resolves a variable's live value from a record.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// `Ok(None)` when the record exists but the field is empty.
    async fn fetch_field_value(
        &self,
        object: &str,
        field: &str,
        record_id: &str,
    ) -> Result<Option<String>, IntegrationError>;
}

/// Uploads header media and returns the vendor handle.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload_media(&self, file: MediaFile) -> Result<String, IntegrationError>;
}

/// Submits a built payload for vendor review.
#[async_trait]
pub trait TemplateSubmitter: Send + Sync {
    async fn submit_template(
        &self,
        payload: &VendorPayload,
    ) -> Result<SubmittedTemplate, IntegrationError>;
}

/// Looks up a flow by ID.
#[async_trait]
pub trait FlowResolver: Send + Sync {
    async fn resolve_flow(&self, flow_id: &str) -> Result<FlowRef, IntegrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope_prefers_user_message() {
        let envelope: VendorErrorEnvelope = serde_json::from_value(json!({
            "error": {
                "message": "Invalid parameter",
                "type": "OAuthException",
                "code": 100,
                "error_subcode": 2388023,
                "error_user_title": "Message template language is being deleted",
                "error_user_msg": "New English content can't be added while the existing content is being deleted."
            }
        }))
        .unwrap();

        assert_eq!(envelope.error.code, Some(100));
        assert!(envelope.error.user_message().starts_with("New English content"));
    }

    #[test]
    fn test_error_envelope_falls_back_to_message() {
        let envelope: VendorErrorEnvelope =
            serde_json::from_value(json!({"error": {"message": "Invalid OAuth access token"}}))
                .unwrap();
        assert_eq!(envelope.error.user_message(), "Invalid OAuth access token");
    }
}
