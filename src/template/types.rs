//! Template draft types and error definitions

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::ValidationError;

/// Message TTL applied to Authentication and Utility templates when the
/// draft does not set one.
pub const DEFAULT_MESSAGE_TTL_SECONDS: u32 = 300;

/// Resolved field values for a sample record, keyed by `Object.Field`.
pub type FieldValues = HashMap<String, String>;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Draft not found: {0}")]
    NotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template failed validation with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("No more {kind} buttons allowed (max {max})")]
    ButtonLimit { kind: ButtonKind, max: usize },

    #[error("No button at position {0}")]
    ButtonNotFound(usize),

    #[error("Variable {{{{{index}}}}} not found in {section}")]
    VariableNotFound { section: TemplateSection, index: u32 },

    #[error("Malformed vendor template: {0}")]
    MalformedVendorTemplate(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Template category as understood by the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "MARKETING", alias = "marketing")]
    Marketing,
    #[serde(alias = "UTILITY", alias = "utility")]
    Utility,
    #[serde(alias = "AUTHENTICATION", alias = "authentication")]
    Authentication,
}

impl Category {
    /// Category string sent in the submission payload.
    pub fn as_vendor_str(&self) -> &'static str {
        match self {
            Category::Marketing => "MARKETING",
            Category::Utility => "UTILITY",
            Category::Authentication => "AUTHENTICATION",
        }
    }

    /// Parse a vendor category, ignoring case.
    pub fn from_vendor(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "MARKETING" => Some(Category::Marketing),
            "UTILITY" => Some(Category::Utility),
            "AUTHENTICATION" => Some(Category::Authentication),
            _ => None,
        }
    }

    /// Whether submissions in this category carry `message_send_ttl_seconds`.
    pub fn has_message_ttl(&self) -> bool {
        matches!(self, Category::Utility | Category::Authentication)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_vendor_str())
    }
}

/// Header format of a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderFormat {
    #[default]
    #[serde(alias = "NONE")]
    None,
    #[serde(alias = "TEXT")]
    Text,
    #[serde(alias = "IMAGE")]
    Image,
    #[serde(alias = "VIDEO")]
    Video,
    #[serde(alias = "DOCUMENT")]
    Document,
}

impl HeaderFormat {
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            HeaderFormat::Image | HeaderFormat::Video | HeaderFormat::Document
        )
    }
}

impl fmt::Display for HeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HeaderFormat::None => "None",
            HeaderFormat::Text => "Text",
            HeaderFormat::Image => "Image",
            HeaderFormat::Video => "Video",
            HeaderFormat::Document => "Document",
        };
        f.write_str(name)
    }
}

/// Template header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub format: HeaderFormat,

    /// Header text (Text format only), may contain one `{{n}}` token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Uploaded media handle (Image/Video/Document formats)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_handle: Option<String>,
}

impl Header {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            format: HeaderFormat::Text,
            text: Some(text.into()),
            media_handle: None,
        }
    }

    pub fn media(format: HeaderFormat, handle: Option<String>) -> Self {
        Self {
            format,
            text: None,
            media_handle: handle,
        }
    }
}

/// Which part of the template a variable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSection {
    Header,
    Body,
}

impl fmt::Display for TemplateSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSection::Header => f.write_str("header"),
            TemplateSection::Body => f.write_str("body"),
        }
    }
}

/// A `{{index}}` placeholder bound to a record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// 1-based, matches the `{{index}}` token in the text
    pub index: u32,

    /// Source object, e.g. `Contact`
    #[serde(default)]
    pub object: String,

    /// Source field, e.g. `FirstName`
    #[serde(default)]
    pub field: String,

    /// Fallback value, also submitted to the vendor as the example
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_text: Option<String>,
}

impl Variable {
    pub fn new(index: u32, object: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            index,
            object: object.into(),
            field: field.into(),
            alternate_text: None,
        }
    }

    pub fn with_alternate_text(mut self, text: impl Into<String>) -> Self {
        self.alternate_text = Some(text.into());
        self
    }

    /// Key into [`FieldValues`].
    pub fn binding_key(&self) -> String {
        format!("{}.{}", self.object, self.field)
    }

    /// Whether the variable is bound to a record field at all.
    pub fn is_bound(&self) -> bool {
        !self.object.is_empty() && !self.field.is_empty()
    }

    /// Example value submitted for vendor review.
    pub fn example_value(&self) -> String {
        self.alternate_text.clone().unwrap_or_default()
    }
}

/// Closed set of button kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ButtonKind {
    QuickReply,
    MarketingOptOut,
    PhoneNumber,
    Url,
    CopyCode,
    Flow,
    Catalog,
    Mpm,
    Otp,
}

impl ButtonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonKind::QuickReply => "QUICK_REPLY",
            ButtonKind::MarketingOptOut => "MARKETING_OPT_OUT",
            ButtonKind::PhoneNumber => "PHONE_NUMBER",
            ButtonKind::Url => "URL",
            ButtonKind::CopyCode => "COPY_CODE",
            ButtonKind::Flow => "FLOW",
            ButtonKind::Catalog => "CATALOG",
            ButtonKind::Mpm => "MPM",
            ButtonKind::Otp => "OTP",
        }
    }

    /// Per-template limit for this kind, if any.
    pub fn limit(&self) -> Option<usize> {
        match self {
            ButtonKind::PhoneNumber => Some(1),
            ButtonKind::Url => Some(2),
            ButtonKind::CopyCode => Some(1),
            ButtonKind::Flow => Some(1),
            ButtonKind::MarketingOptOut => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL button type. Only static URLs are supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlType {
    #[default]
    #[serde(alias = "STATIC", alias = "static")]
    Static,
}

/// Label the vendor shows on copy-code buttons.
pub const COPY_CODE_LABEL: &str = "Copy offer code";

/// Label of the synthetic Authentication button.
pub const OTP_BUTTON_LABEL: &str = "Verify Code";

/// A template button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Button {
    QuickReply {
        text: String,
    },
    MarketingOptOut {
        text: String,
    },
    PhoneNumber {
        text: String,
        #[serde(default)]
        country_code: String,
        phone_digits: String,
    },
    Url {
        text: String,
        #[serde(default)]
        url_type: UrlType,
        url: String,
    },
    CopyCode {
        offer_code: String,
    },
    Flow {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_id: Option<String>,
    },
    Catalog {
        text: String,
    },
    Mpm {
        text: String,
    },
    Otp {
        text: String,
    },
}

impl Button {
    pub fn quick_reply(text: impl Into<String>) -> Self {
        Button::QuickReply { text: text.into() }
    }

    pub fn phone_number(
        text: impl Into<String>,
        country_code: impl Into<String>,
        phone_digits: impl Into<String>,
    ) -> Self {
        Button::PhoneNumber {
            text: text.into(),
            country_code: country_code.into(),
            phone_digits: phone_digits.into(),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Url {
            text: text.into(),
            url_type: UrlType::Static,
            url: url.into(),
        }
    }

    pub fn kind(&self) -> ButtonKind {
        match self {
            Button::QuickReply { .. } => ButtonKind::QuickReply,
            Button::MarketingOptOut { .. } => ButtonKind::MarketingOptOut,
            Button::PhoneNumber { .. } => ButtonKind::PhoneNumber,
            Button::Url { .. } => ButtonKind::Url,
            Button::CopyCode { .. } => ButtonKind::CopyCode,
            Button::Flow { .. } => ButtonKind::Flow,
            Button::Catalog { .. } => ButtonKind::Catalog,
            Button::Mpm { .. } => ButtonKind::Mpm,
            Button::Otp { .. } => ButtonKind::Otp,
        }
    }

    /// Label shown on the button.
    pub fn label(&self) -> &str {
        match self {
            Button::QuickReply { text }
            | Button::MarketingOptOut { text }
            | Button::PhoneNumber { text, .. }
            | Button::Url { text, .. }
            | Button::Flow { text, .. }
            | Button::Catalog { text }
            | Button::Mpm { text }
            | Button::Otp { text } => text,
            Button::CopyCode { .. } => COPY_CODE_LABEL,
        }
    }
}

/// Options that only apply to Authentication templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationOptions {
    #[serde(default)]
    pub add_security_recommendation: bool,

    /// Emit `code_expiration_minutes` in the footer
    #[serde(default)]
    pub code_expiration_enabled: bool,
}

/// An in-memory template draft.
///
/// Drafts own their variable and button lists. Transitions live in
/// `draft.rs` and always return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Lowercase, underscore-separated template name
    pub name: String,

    /// Language code, e.g. `en_US`
    pub language: String,

    pub category: Category,

    #[serde(default)]
    pub header: Header,

    /// Body text with `{{n}}` tokens
    #[serde(default)]
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    #[serde(default)]
    pub buttons: Vec<Button>,

    #[serde(default)]
    pub header_variables: Vec<Variable>,

    #[serde(default)]
    pub body_variables: Vec<Variable>,

    /// Expiry in seconds; drives message TTL and code expiration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_seconds: Option<u32>,

    #[serde(default)]
    pub authentication: AuthenticationOptions,
}

impl TemplateDraft {
    /// Variables of one section.
    pub fn variables(&self, section: TemplateSection) -> &[Variable] {
        match section {
            TemplateSection::Header => &self.header_variables,
            TemplateSection::Body => &self.body_variables,
        }
    }

    /// Text of one section; an absent header text reads as empty.
    pub fn section_text(&self, section: TemplateSection) -> &str {
        match section {
            TemplateSection::Header => self.header.text.as_deref().unwrap_or_default(),
            TemplateSection::Body => &self.body,
        }
    }

    /// Expiry used for TTL and code expiration.
    pub fn effective_expire_seconds(&self) -> u32 {
        self.expire_seconds.unwrap_or(DEFAULT_MESSAGE_TTL_SECONDS)
    }

    /// Number of buttons of the given kind.
    pub fn button_count(&self, kind: ButtonKind) -> usize {
        self.buttons.iter().filter(|b| b.kind() == kind).count()
    }
}
