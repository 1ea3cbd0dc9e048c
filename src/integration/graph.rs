//! WhatsApp Cloud (Graph) API client.
//!
//! Implements template submission, resumable header media upload and flow
//! lookup. Requests are made once; callers decide whether to retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::config::GraphConfig;
use crate::metrics::{MEDIA_UPLOAD_CHUNKS_TOTAL, VENDOR_REQUEST_DURATION_SECONDS};
use crate::template::VendorPayload;

use super::traits::{
    FlowRef, FlowResolver, IntegrationError, MediaFile, MediaUploader, SubmittedTemplate,
    TemplateSubmitter, VendorErrorEnvelope,
};

#[derive(Debug, Deserialize)]
struct UploadSession {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UploadChunkResponse {
    #[serde(default)]
    h: Option<String>,
}

/// Graph API client shared by all remote collaborators.
pub struct GraphClient {
    config: GraphConfig,
    client: Client,
}

impl GraphClient {
    pub fn new(config: GraphConfig) -> Result<Self, IntegrationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        tracing::info!(
            base_url = %config.base_url,
            api_version = %config.api_version,
            "Graph API client initialized"
        );

        Ok(Self { config, client })
    }

    fn require(value: &str, name: &str) -> Result<(), IntegrationError> {
        if value.is_empty() {
            return Err(IntegrationError::NotConfigured(format!("graph.{name} is empty")));
        }
        Ok(())
    }

    async fn start_upload(&self, file: &MediaFile) -> Result<String, IntegrationError> {
        Self::require(&self.config.app_id, "app_id")?;

        let url = self.config.endpoint(&format!("{}/uploads", self.config.app_id));
        let file_length = file.bytes.len().to_string();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[
                ("file_name", file.file_name.as_str()),
                ("file_length", file_length.as_str()),
                ("file_type", file.mime_type.as_str()),
            ])
            .send()
            .await?;

        let session: UploadSession = parse_response(response, upload_error).await?;
        Ok(session.id)
    }
}

/// Decode a success body, or turn the vendor error envelope into an error.
async fn parse_response<T, F>(response: Response, on_error: F) -> Result<T, IntegrationError>
where
    T: for<'de> Deserialize<'de>,
    F: FnOnce(String, Option<i64>) -> IntegrationError,
{
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<VendorErrorEnvelope>(&body) {
            Ok(envelope) => on_error(envelope.error.user_message(), envelope.error.code),
            Err(_) => IntegrationError::UnexpectedResponse(format!("{status}: {body}")),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| IntegrationError::UnexpectedResponse(format!("{e}: {body}")))
}

fn upload_error(message: String, _code: Option<i64>) -> IntegrationError {
    IntegrationError::Upload(message)
}

#[async_trait]
impl TemplateSubmitter for GraphClient {
    async fn submit_template(
        &self,
        payload: &VendorPayload,
    ) -> Result<SubmittedTemplate, IntegrationError> {
        Self::require(&self.config.business_account_id, "business_account_id")?;
        let _timer = VENDOR_REQUEST_DURATION_SECONDS
            .with_label_values(&["submit"])
            .start_timer();

        let url = self.config.endpoint(&format!(
            "{}/message_templates",
            self.config.business_account_id
        ));

        tracing::debug!(template = %payload.name, url = %url, "Submitting template");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .json(payload)
            .send()
            .await?;

        parse_response(response, |message, code| IntegrationError::Rejected {
            message,
            code,
        })
        .await
    }
}

#[async_trait]
impl MediaUploader for GraphClient {
    async fn upload_media(&self, file: MediaFile) -> Result<String, IntegrationError> {
        if file.bytes.is_empty() {
            return Err(IntegrationError::Upload(format!(
                "{} is empty",
                file.file_name
            )));
        }
        let _timer = VENDOR_REQUEST_DURATION_SECONDS
            .with_label_values(&["upload"])
            .start_timer();

        let session_id = self.start_upload(&file).await?;
        let url = self.config.endpoint(&session_id);
        let chunk_size = self.config.upload_chunk_size.max(1);

        // Chunks go out in order; the handle arrives with the last one.
        let mut handle = None;
        for (i, chunk) in file.bytes.chunks(chunk_size).enumerate() {
            let offset = i * chunk_size;
            let response = self
                .client
                .post(&url)
                .header(
                    reqwest::header::AUTHORIZATION,
                    format!("OAuth {}", self.config.access_token),
                )
                .header("file_offset", offset.to_string())
                .body(chunk.to_vec())
                .send()
                .await?;

            let parsed: UploadChunkResponse = parse_response(response, upload_error).await?;
            MEDIA_UPLOAD_CHUNKS_TOTAL.inc();
            tracing::debug!(
                session = %session_id,
                offset,
                len = chunk.len(),
                "Uploaded media chunk"
            );
            handle = parsed.h.or(handle);
        }

        handle.ok_or_else(|| {
            IntegrationError::UnexpectedResponse("upload finished without a handle".to_string())
        })
    }
}

#[async_trait]
impl FlowResolver for GraphClient {
    async fn resolve_flow(&self, flow_id: &str) -> Result<FlowRef, IntegrationError> {
        let _timer = VENDOR_REQUEST_DURATION_SECONDS
            .with_label_values(&["flow"])
            .start_timer();

        let url = self.config.endpoint(flow_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .query(&[("fields", "id,name,status")])
            .send()
            .await?;

        parse_response(response, |message, _| {
            IntegrationError::FlowNotFound(format!("{flow_id}: {message}"))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_empty() {
        assert!(matches!(
            GraphClient::require("", "app_id"),
            Err(IntegrationError::NotConfigured(_))
        ));
        assert!(GraphClient::require("123", "app_id").is_ok());
    }

    #[tokio::test]
    async fn test_submit_without_account_is_not_configured() {
        let client = GraphClient::new(GraphConfig {
            access_token: "token".to_string(),
            ..GraphConfig::default()
        })
        .unwrap();

        let draft = crate::template::TemplateDraft::new(
            "hello",
            "en_US",
            crate::template::Category::Marketing,
        )
        .with_body("Hello");
        let payload = crate::template::build(&draft).unwrap();

        assert!(matches!(
            client.submit_template(&payload).await,
            Err(IntegrationError::NotConfigured(_))
        ));
    }
}
