//! WhatsApp message template drafts.
//!
//! This module provides:
//! - The draft model with `{{n}}` placeholder variables and typed buttons
//! - Draft transitions that return a new draft instead of mutating in place
//! - Validation that collects every structural problem
//! - The vendor payload builder
//! - Text formatting and preview rendering through one substitution engine
//! - Hydration of drafts from templates stored at the vendor
//! - In-memory draft storage with CRUD operations
//!
//! # Example
//!
//! ```ignore
//! let draft = TemplateDraft::new("welcome_msg", "en_US", Category::Marketing)
//!     .with_header(Header::text("Hi "))
//!     .add_variable(TemplateSection::Header, "Contact", "FirstName", Some("John".into()))?
//!     .with_body("Thanks for joining!")
//!     .with_footer(Some("Reply STOP to opt out".into()));
//!
//! let payload = build(&draft).map_err(TemplateError::Validation)?;
//! let preview = PreviewRenderer::default().render(&draft, None);
//! ```

mod draft;
mod formatter;
mod hydrate;
mod payload;
mod preview;
mod store;
mod substitution;
mod types;
mod validation;

pub use formatter::{format_text, format_text_unescaped};
pub use payload::{
    build, vendor_button, BodyExample, ButtonExample, Component, HeaderExample, VendorButton,
    VendorPayload,
};
pub use preview::{button_icon, Preview, PreviewButton, PreviewHeader, PreviewRenderer};
pub use store::{create_draft_store, DraftStatus, DraftStore, StoredDraft};
pub use substitution::{
    append_variable, count_tokens, remove_variable, renumber_by_encounter, substitute, token,
    token_indices,
};
pub use types::{
    AuthenticationOptions, Button, ButtonKind, Category, FieldValues, Header, HeaderFormat,
    TemplateDraft, TemplateError, TemplateResult, TemplateSection, UrlType, Variable,
    COPY_CODE_LABEL, DEFAULT_MESSAGE_TTL_SECONDS, OTP_BUTTON_LABEL,
};
pub use validation::{validate, ValidationError, MAX_BUTTONS};
