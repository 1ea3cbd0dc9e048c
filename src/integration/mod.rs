//! Remote collaborators: record lookups, media upload, template submission
//! and flow lookup, each with an in-memory and (where it exists) a Graph API
//! implementation.

mod factory;
mod graph;
mod memory;
mod traits;

pub use factory::{create_integrations, Integrations};
pub use graph::GraphClient;
pub use memory::{
    MemoryFieldResolver, MemoryFlowResolver, MemoryMediaUploader, MemoryTemplateSubmitter,
};
pub use traits::{
    FieldResolver, FlowRef, FlowResolver, IntegrationError, MediaFile, MediaUploader,
    SubmittedTemplate, TemplateSubmitter, VendorErrorBody, VendorErrorEnvelope,
};
