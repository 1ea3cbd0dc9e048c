//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use crate::template::ValidationError;

use super::{
    DRAFTS_STORED, MEDIA_UPLOADS_TOTAL, PAYLOADS_BUILT_TOTAL, PREVIEWS_RENDERED_TOTAL,
    SUBMISSIONS_TOTAL, VALIDATION_FAILURES_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording draft metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    pub fn set_drafts_stored(count: usize) {
        DRAFTS_STORED.set(count as i64);
    }

    pub fn record_payload_built() {
        PAYLOADS_BUILT_TOTAL.inc();
    }

    /// Count each reported error under its code
    pub fn record_validation_errors(errors: &[ValidationError]) {
        for error in errors {
            VALIDATION_FAILURES_TOTAL
                .with_label_values(&[error.code()])
                .inc();
        }
    }

    pub fn record_preview() {
        PREVIEWS_RENDERED_TOTAL.inc();
    }
}

/// Helper struct for recording submission metrics
pub struct SubmissionMetrics;

impl SubmissionMetrics {
    pub fn record_accepted() {
        SUBMISSIONS_TOTAL.with_label_values(&["accepted"]).inc();
    }

    pub fn record_rejected() {
        SUBMISSIONS_TOTAL.with_label_values(&["rejected"]).inc();
    }

    pub fn record_error() {
        SUBMISSIONS_TOTAL.with_label_values(&["error"]).inc();
    }
}

/// Helper struct for recording media metrics
pub struct MediaMetrics;

impl MediaMetrics {
    pub fn record_upload(success: bool) {
        let outcome = if success { "success" } else { "failure" };
        MEDIA_UPLOADS_TOTAL.with_label_values(&[outcome]).inc();
    }
}
