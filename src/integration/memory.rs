//! In-memory collaborators.
//!
//! Used when no Graph API token is configured and throughout the tests.
//! Nothing here survives a restart.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::template::VendorPayload;

use super::traits::{
    FieldResolver, FlowRef, FlowResolver, IntegrationError, MediaFile, MediaUploader,
    SubmittedTemplate, TemplateSubmitter,
};

/// Record values keyed by `(object, record_id)`, then by field name.
#[derive(Default)]
pub struct MemoryFieldResolver {
    records: DashMap<(String, String), DashMap<String, String>>,
}

impl MemoryFieldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field on a record, creating the record if needed.
    pub fn insert(&self, object: &str, record_id: &str, field: &str, value: &str) {
        self.records
            .entry((object.to_string(), record_id.to_string()))
            .or_default()
            .insert(field.to_string(), value.to_string());
    }
}

#[async_trait]
impl FieldResolver for MemoryFieldResolver {
    async fn fetch_field_value(
        &self,
        object: &str,
        field: &str,
        record_id: &str,
    ) -> Result<Option<String>, IntegrationError> {
        let record = self
            .records
            .get(&(object.to_string(), record_id.to_string()))
            .ok_or_else(|| IntegrationError::RecordNotFound(format!("{object}/{record_id}")))?;

        Ok(record
            .get(field)
            .map(|v| v.value().clone())
            .filter(|v| !v.is_empty()))
    }
}

/// Keeps uploaded files and hands out opaque handles.
#[derive(Default)]
pub struct MemoryMediaUploader {
    uploads: DashMap<String, MediaFile>,
}

impl MemoryMediaUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: &str) -> Option<MediaFile> {
        self.uploads.get(handle).map(|f| f.clone())
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.len()
    }
}

#[async_trait]
impl MediaUploader for MemoryMediaUploader {
    async fn upload_media(&self, file: MediaFile) -> Result<String, IntegrationError> {
        if file.bytes.is_empty() {
            return Err(IntegrationError::Upload(format!(
                "{} is empty",
                file.file_name
            )));
        }

        let handle = format!("4::{}", Uuid::new_v4().simple());
        tracing::debug!(
            handle = %handle,
            file_name = %file.file_name,
            size = file.bytes.len(),
            "Media stored in memory"
        );
        self.uploads.insert(handle.clone(), file);
        Ok(handle)
    }
}

/// Records submitted payloads. Optionally rejects everything.
#[derive(Default)]
pub struct MemoryTemplateSubmitter {
    submitted: Mutex<Vec<VendorPayload>>,
    rejection: Option<String>,
}

impl MemoryTemplateSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A submitter that rejects every payload with `message`.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            rejection: Some(message.into()),
        }
    }

    pub async fn submitted(&self) -> Vec<VendorPayload> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl TemplateSubmitter for MemoryTemplateSubmitter {
    async fn submit_template(
        &self,
        payload: &VendorPayload,
    ) -> Result<SubmittedTemplate, IntegrationError> {
        if let Some(message) = &self.rejection {
            return Err(IntegrationError::Rejected {
                message: message.clone(),
                code: None,
            });
        }

        let mut submitted = self.submitted.lock().await;
        submitted.push(payload.clone());

        Ok(SubmittedTemplate {
            id: (1_000_000 + submitted.len()).to_string(),
            status: "PENDING".to_string(),
            category: payload.category.clone(),
        })
    }
}

/// Known flows by ID.
#[derive(Default)]
pub struct MemoryFlowResolver {
    flows: DashMap<String, FlowRef>,
}

impl MemoryFlowResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, flow: FlowRef) {
        self.flows.insert(flow.id.clone(), flow);
    }
}

#[async_trait]
impl FlowResolver for MemoryFlowResolver {
    async fn resolve_flow(&self, flow_id: &str) -> Result<FlowRef, IntegrationError> {
        self.flows
            .get(flow_id)
            .map(|f| f.clone())
            .ok_or_else(|| IntegrationError::FlowNotFound(flow_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{build, Category, TemplateDraft};

    #[tokio::test]
    async fn test_field_resolver() {
        let resolver = MemoryFieldResolver::new();
        resolver.insert("Contact", "003A", "FirstName", "Ada");
        resolver.insert("Contact", "003A", "Nickname", "");

        let value = resolver
            .fetch_field_value("Contact", "FirstName", "003A")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("Ada"));

        // empty and missing fields both read as no value
        assert!(resolver
            .fetch_field_value("Contact", "Nickname", "003A")
            .await
            .unwrap()
            .is_none());
        assert!(resolver
            .fetch_field_value("Contact", "Email", "003A")
            .await
            .unwrap()
            .is_none());

        assert!(matches!(
            resolver.fetch_field_value("Contact", "FirstName", "nope").await,
            Err(IntegrationError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_media_uploader() {
        let uploader = MemoryMediaUploader::new();
        let handle = uploader
            .upload_media(MediaFile {
                file_name: "banner.png".to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            })
            .await
            .unwrap();

        assert!(handle.starts_with("4::"));
        assert_eq!(uploader.get(&handle).unwrap().file_name, "banner.png");

        let empty = uploader
            .upload_media(MediaFile {
                file_name: "empty.png".to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![],
            })
            .await;
        assert!(matches!(empty, Err(IntegrationError::Upload(_))));
        assert_eq!(uploader.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_submitter_records_and_rejects() {
        let draft = TemplateDraft::new("order_update", "en_US", Category::Utility)
            .with_body("Your order has shipped");
        let payload = build(&draft).unwrap();

        let submitter = MemoryTemplateSubmitter::new();
        let result = submitter.submit_template(&payload).await.unwrap();
        assert_eq!(result.status, "PENDING");
        assert_eq!(result.category, "UTILITY");
        assert_eq!(submitter.submitted().await.len(), 1);

        let rejecting = MemoryTemplateSubmitter::rejecting("Duplicate template name");
        let err = rejecting.submit_template(&payload).await.unwrap_err();
        assert!(matches!(err, IntegrationError::Rejected { .. }));
        assert!(rejecting.submitted().await.is_empty());
    }

    #[tokio::test]
    async fn test_flow_resolver() {
        let resolver = MemoryFlowResolver::new();
        resolver.insert(FlowRef {
            id: "1234".to_string(),
            name: "Sign up".to_string(),
            status: "PUBLISHED".to_string(),
        });

        assert_eq!(resolver.resolve_flow("1234").await.unwrap().name, "Sign up");
        assert!(matches!(
            resolver.resolve_flow("9999").await,
            Err(IntegrationError::FlowNotFound(_))
        ));
    }
}
