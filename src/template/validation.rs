//! Structural validation of template drafts.
//!
//! `validate` never stops at the first problem: every violation is collected
//! so callers can report them all at once.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use super::substitution::{count_tokens, token_indices};
use super::types::{
    Button, ButtonKind, Category, HeaderFormat, TemplateDraft, TemplateSection, Variable,
};

pub const MAX_NAME_LENGTH: usize = 512;
pub const MAX_HEADER_TEXT_LENGTH: usize = 60;
pub const MAX_BODY_LENGTH: usize = 1024;
pub const MAX_FOOTER_LENGTH: usize = 60;
pub const MAX_BUTTON_TEXT_LENGTH: usize = 25;
pub const MAX_BUTTONS: usize = 10;
pub const MAX_URL_LENGTH: usize = 2000;
pub const MAX_OFFER_CODE_LENGTH: usize = 15;
pub const MAX_HEADER_VARIABLES: usize = 1;

/// One structural problem in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Template name is required")]
    EmptyName,

    #[error("Template name may only contain lowercase letters, digits and underscores: {name}")]
    InvalidName { name: String },

    #[error("Template language is required")]
    EmptyLanguage,

    #[error("Body text is required")]
    EmptyBody,

    #[error("{part} is {len} characters, max {max}")]
    TextTooLong {
        part: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{format} header {reason}")]
    HeaderFormatMismatch {
        format: HeaderFormat,
        reason: &'static str,
    },

    #[error("Header text may contain at most one variable, found {count}")]
    HeaderVariableLimit { count: usize },

    #[error("Variables in {section} do not match its text: {reason}")]
    VariableMismatch {
        section: TemplateSection,
        reason: String,
    },

    #[error("At most {max} {kind} button(s) allowed, found {count}")]
    ButtonLimitExceeded {
        kind: ButtonKind,
        max: usize,
        count: usize,
    },

    #[error("At most {max} buttons allowed, found {count}")]
    TooManyButtons { count: usize, max: usize },

    #[error("Button text must be unique: \"{text}\"")]
    DuplicateButtonText { text: String },

    #[error("{kind} button is missing {field}")]
    MissingButtonField {
        kind: ButtonKind,
        field: &'static str,
    },

    #[error("Button text \"{text}\" exceeds {max} characters")]
    ButtonTextTooLong { text: String, max: usize },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Invalid phone number: {value}")]
    InvalidPhoneNumber { value: String },

    #[error("Offer code must be 1-15 alphanumeric characters: {code}")]
    InvalidOfferCode { code: String },

    #[error("FLOW button \"{text}\" has no flow selected")]
    MissingFlowId { text: String },

    #[error("{kind} buttons are generated by the vendor and cannot be added")]
    UnsupportedButton { kind: ButtonKind },
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyName => "EMPTY_NAME",
            ValidationError::InvalidName { .. } => "INVALID_NAME",
            ValidationError::EmptyLanguage => "EMPTY_LANGUAGE",
            ValidationError::EmptyBody => "EMPTY_BODY",
            ValidationError::TextTooLong { .. } => "TEXT_TOO_LONG",
            ValidationError::HeaderFormatMismatch { .. } => "HEADER_FORMAT_MISMATCH",
            ValidationError::HeaderVariableLimit { .. } => "HEADER_VARIABLE_LIMIT",
            ValidationError::VariableMismatch { .. } => "VARIABLE_MISMATCH",
            ValidationError::ButtonLimitExceeded { .. } => "BUTTON_LIMIT_EXCEEDED",
            ValidationError::TooManyButtons { .. } => "TOO_MANY_BUTTONS",
            ValidationError::DuplicateButtonText { .. } => "DUPLICATE_BUTTON_TEXT",
            ValidationError::MissingButtonField { .. } => "MISSING_BUTTON_FIELD",
            ValidationError::ButtonTextTooLong { .. } => "BUTTON_TEXT_TOO_LONG",
            ValidationError::InvalidUrl { .. } => "INVALID_URL",
            ValidationError::InvalidPhoneNumber { .. } => "INVALID_PHONE_NUMBER",
            ValidationError::InvalidOfferCode { .. } => "INVALID_OFFER_CODE",
            ValidationError::MissingFlowId { .. } => "MISSING_FLOW_ID",
            ValidationError::UnsupportedButton { .. } => "UNSUPPORTED_BUTTON",
        }
    }
}

/// Collect every structural problem in the draft.
pub fn validate(draft: &TemplateDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_identity(draft, &mut errors);
    validate_header(draft, &mut errors);
    validate_body(draft, &mut errors);

    if let Some(footer) = &draft.footer {
        check_length("Footer", footer, MAX_FOOTER_LENGTH, &mut errors);
    }

    // Authentication buttons are replaced by the synthetic OTP button
    if draft.category != Category::Authentication {
        validate_buttons(&draft.buttons, &mut errors);
    }

    errors
}

fn validate_identity(draft: &TemplateDraft, errors: &mut Vec<ValidationError>) {
    if draft.name.is_empty() {
        errors.push(ValidationError::EmptyName);
    } else {
        if !draft
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            errors.push(ValidationError::InvalidName {
                name: draft.name.clone(),
            });
        }
        check_length("Template name", &draft.name, MAX_NAME_LENGTH, errors);
    }

    if draft.language.trim().is_empty() {
        errors.push(ValidationError::EmptyLanguage);
    }
}

fn validate_header(draft: &TemplateDraft, errors: &mut Vec<ValidationError>) {
    let header = &draft.header;

    match header.format {
        HeaderFormat::None => {
            if header.text.is_some() || header.media_handle.is_some() {
                errors.push(ValidationError::HeaderFormatMismatch {
                    format: header.format,
                    reason: "must not carry text or media",
                });
            }
        }
        HeaderFormat::Text => {
            match header.text.as_deref() {
                Some(text) if !text.trim().is_empty() => {
                    check_length("Header text", text, MAX_HEADER_TEXT_LENGTH, errors);

                    let count = count_tokens(text);
                    if count > MAX_HEADER_VARIABLES {
                        errors.push(ValidationError::HeaderVariableLimit { count });
                    }
                }
                _ => errors.push(ValidationError::HeaderFormatMismatch {
                    format: header.format,
                    reason: "requires text",
                }),
            }
            if header.media_handle.is_some() {
                errors.push(ValidationError::HeaderFormatMismatch {
                    format: header.format,
                    reason: "must not carry a media handle",
                });
            }
        }
        HeaderFormat::Image | HeaderFormat::Video | HeaderFormat::Document => {
            if header.media_handle.as_deref().map_or(true, str::is_empty) {
                errors.push(ValidationError::HeaderFormatMismatch {
                    format: header.format,
                    reason: "requires an uploaded media handle",
                });
            }
            if header.text.is_some() {
                errors.push(ValidationError::HeaderFormatMismatch {
                    format: header.format,
                    reason: "must not carry text",
                });
            }
        }
    }

    if header.format == HeaderFormat::Text {
        check_variables(
            TemplateSection::Header,
            draft.section_text(TemplateSection::Header),
            &draft.header_variables,
            errors,
        );
    } else if !draft.header_variables.is_empty() {
        errors.push(ValidationError::VariableMismatch {
            section: TemplateSection::Header,
            reason: format!("{} header cannot have variables", header.format),
        });
    }
}

fn validate_body(draft: &TemplateDraft, errors: &mut Vec<ValidationError>) {
    // The vendor generates Authentication body text
    if draft.category == Category::Authentication {
        return;
    }

    if draft.body.trim().is_empty() {
        errors.push(ValidationError::EmptyBody);
        return;
    }

    check_length("Body", &draft.body, MAX_BODY_LENGTH, errors);
    check_variables(
        TemplateSection::Body,
        &draft.body,
        &draft.body_variables,
        errors,
    );
}

/// Tokens used in the text must be exactly `1..=n` for `n` variables, and
/// the variable list must be labelled `1..=n` in order.
fn check_variables(
    section: TemplateSection,
    text: &str,
    variables: &[Variable],
    errors: &mut Vec<ValidationError>,
) {
    let expected: Vec<u32> = (1..=variables.len() as u32).collect();
    let labels: Vec<u32> = variables.iter().map(|v| v.index).collect();
    if labels != expected {
        errors.push(ValidationError::VariableMismatch {
            section,
            reason: format!("variable indices {:?} are not contiguous from 1", labels),
        });
        return;
    }

    let used: BTreeSet<u32> = token_indices(text).into_iter().collect();
    let declared: BTreeSet<u32> = expected.into_iter().collect();
    if used != declared {
        errors.push(ValidationError::VariableMismatch {
            section,
            reason: format!(
                "text uses tokens {:?} but {} variable(s) are defined",
                used,
                declared.len()
            ),
        });
    }
}

fn validate_buttons(buttons: &[Button], errors: &mut Vec<ValidationError>) {
    if buttons.len() > MAX_BUTTONS {
        errors.push(ValidationError::TooManyButtons {
            count: buttons.len(),
            max: MAX_BUTTONS,
        });
    }

    for kind in [
        ButtonKind::PhoneNumber,
        ButtonKind::Url,
        ButtonKind::CopyCode,
        ButtonKind::Flow,
        ButtonKind::MarketingOptOut,
    ] {
        let count = buttons.iter().filter(|b| b.kind() == kind).count();
        if let Some(max) = kind.limit() {
            if count > max {
                errors.push(ValidationError::ButtonLimitExceeded { kind, max, count });
            }
        }
    }

    let mut seen = HashSet::new();
    for button in buttons {
        let label = button.label();
        if !label.trim().is_empty() && !seen.insert(label) {
            errors.push(ValidationError::DuplicateButtonText {
                text: label.to_string(),
            });
        }
        validate_button(button, errors);
    }
}

fn validate_button(button: &Button, errors: &mut Vec<ValidationError>) {
    let kind = button.kind();

    if let Button::CopyCode { offer_code } = button {
        if offer_code.is_empty() {
            errors.push(ValidationError::MissingButtonField {
                kind,
                field: "offer_code",
            });
        } else if offer_code.len() > MAX_OFFER_CODE_LENGTH
            || !offer_code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            errors.push(ValidationError::InvalidOfferCode {
                code: offer_code.clone(),
            });
        }
        return;
    }

    let text = button.label();
    if text.trim().is_empty() {
        errors.push(ValidationError::MissingButtonField { kind, field: "text" });
    } else if text.chars().count() > MAX_BUTTON_TEXT_LENGTH {
        errors.push(ValidationError::ButtonTextTooLong {
            text: text.to_string(),
            max: MAX_BUTTON_TEXT_LENGTH,
        });
    }

    match button {
        Button::PhoneNumber {
            country_code,
            phone_digits,
            ..
        } => {
            if phone_digits.is_empty() {
                errors.push(ValidationError::MissingButtonField {
                    kind,
                    field: "phone_digits",
                });
            } else if !is_valid_phone(country_code, phone_digits) {
                errors.push(ValidationError::InvalidPhoneNumber {
                    value: format!("+{}{}", country_code, phone_digits),
                });
            }
        }
        Button::Url { url, .. } => {
            if url.is_empty() {
                errors.push(ValidationError::MissingButtonField { kind, field: "url" });
            } else if !is_valid_url(url) {
                errors.push(ValidationError::InvalidUrl { url: url.clone() });
            }
        }
        Button::Flow { flow_id, .. } => {
            if flow_id.as_deref().map_or(true, str::is_empty) {
                errors.push(ValidationError::MissingFlowId {
                    text: text.to_string(),
                });
            }
        }
        Button::Otp { .. } => errors.push(ValidationError::UnsupportedButton { kind }),
        _ => {}
    }
}

/// An empty country code means `phone_digits` is already a full
/// international number.
fn is_valid_phone(country_code: &str, phone_digits: &str) -> bool {
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(country_code) || !all_digits(phone_digits) {
        return false;
    }
    if country_code.len() > 4 {
        return false;
    }
    let total = country_code.len() + phone_digits.len();
    (4..=15).contains(&phone_digits.len()) && total <= 15
}

fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            url.len() <= MAX_URL_LENGTH
                && !rest.is_empty()
                && !rest.starts_with('/')
                && !url.chars().any(char::is_whitespace)
                && count_tokens(url) == 0
        }
        None => false,
    }
}

fn check_length(part: &'static str, text: &str, max: usize, errors: &mut Vec<ValidationError>) {
    let len = text.chars().count();
    if len > max {
        errors.push(ValidationError::TextTooLong { part, len, max });
    }
}
