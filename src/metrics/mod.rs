//! Prometheus metrics for the template service.
//!
//! - Draft metrics (stored drafts, payload builds, validation failures)
//! - Submission metrics (outcomes, vendor latency)
//! - Media upload metrics

mod helpers;

pub use helpers::{encode_metrics, MediaMetrics, SubmissionMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "wa_template";

lazy_static! {
    // ============================================================================
    // Draft Metrics
    // ============================================================================

    /// Drafts currently held in the store
    pub static ref DRAFTS_STORED: IntGauge = register_int_gauge!(
        format!("{}_drafts_stored", METRIC_PREFIX),
        "Number of drafts currently stored"
    ).unwrap();

    /// Payloads built successfully
    pub static ref PAYLOADS_BUILT_TOTAL: IntCounter = register_int_counter!(
        format!("{}_payloads_built_total", METRIC_PREFIX),
        "Total vendor payloads built"
    ).unwrap();

    /// Validation failures by error code
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_validation_failures_total", METRIC_PREFIX),
        "Total validation errors reported while building payloads",
        &["code"]
    ).unwrap();

    /// Previews rendered
    pub static ref PREVIEWS_RENDERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_previews_rendered_total", METRIC_PREFIX),
        "Total previews rendered"
    ).unwrap();

    // ============================================================================
    // Submission Metrics
    // ============================================================================

    /// Submissions by outcome (accepted, rejected, error)
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_submissions_total", METRIC_PREFIX),
        "Total template submissions by outcome",
        &["outcome"]
    ).unwrap();

    /// Vendor request latency by operation
    pub static ref VENDOR_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        format!("{}_vendor_request_duration_seconds", METRIC_PREFIX),
        "Graph API request latency in seconds",
        &["operation"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    // ============================================================================
    // Media Metrics
    // ============================================================================

    /// Media uploads by outcome
    pub static ref MEDIA_UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_media_uploads_total", METRIC_PREFIX),
        "Total header media uploads by outcome",
        &["outcome"]
    ).unwrap();

    /// Upload chunks sent
    pub static ref MEDIA_UPLOAD_CHUNKS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_media_upload_chunks_total", METRIC_PREFIX),
        "Total resumable upload chunks sent"
    ).unwrap();
}
