//! Vendor submission payload and the pure builder that produces it.

use serde::{Deserialize, Serialize};

use super::types::{
    Button, Category, HeaderFormat, TemplateDraft, Variable, OTP_BUTTON_LABEL,
};
use super::validation::{validate, ValidationError};

/// Template submission payload in the vendor's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorPayload {
    pub name: String,
    pub language: String,
    pub category: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_send_ttl_seconds: Option<u32>,
}

/// One entry of the `components` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Component {
    Header {
        format: HeaderFormat,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        example: Option<HeaderExample>,
    },
    Body {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        add_security_recommendation: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        example: Option<BodyExample>,
    },
    Footer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code_expiration_minutes: Option<u32>,
    },
    Buttons {
        buttons: Vec<VendorButton>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderExample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_handle: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyExample {
    pub body_text: Vec<Vec<String>>,
}

/// Button example: a plain string for copy codes, a list for dynamic URLs
/// on templates fetched from the vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ButtonExample {
    Single(String),
    Many(Vec<String>),
}

impl ButtonExample {
    pub fn first(&self) -> Option<&str> {
        match self {
            ButtonExample::Single(value) => Some(value),
            ButtonExample::Many(values) => values.first().map(String::as_str),
        }
    }
}

/// One vendor button object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorButton {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<ButtonExample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_type: Option<String>,
}

impl VendorButton {
    fn new(kind: &str, text: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.map(str::to_string),
            phone_number: None,
            url: None,
            example: None,
            flow_id: None,
            flow_action: None,
            otp_type: None,
        }
    }

    /// The single button every Authentication template carries.
    pub fn otp_copy_code() -> Self {
        Self {
            otp_type: Some("COPY_CODE".to_string()),
            ..Self::new("OTP", Some(OTP_BUTTON_LABEL))
        }
    }
}

impl VendorPayload {
    pub fn header(&self) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| matches!(c, Component::Header { .. }))
    }

    pub fn buttons(&self) -> &[VendorButton] {
        self.components
            .iter()
            .find_map(|c| match c {
                Component::Buttons { buttons } => Some(buttons.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Build the vendor payload for a draft.
///
/// Validation runs first and every problem is returned; a payload is only
/// produced from a draft with no errors.
pub fn build(draft: &TemplateDraft) -> Result<VendorPayload, Vec<ValidationError>> {
    let errors = validate(draft);
    if !errors.is_empty() {
        tracing::debug!(
            template = %draft.name,
            error_count = errors.len(),
            "Draft failed validation"
        );
        return Err(errors);
    }

    let mut errors = Vec::new();
    let mut components = Vec::with_capacity(4);

    if let Some(header) = header_component(draft) {
        components.push(header);
    }
    if let Some(body) = body_component(draft) {
        components.push(body);
    }
    if let Some(footer) = footer_component(draft) {
        components.push(footer);
    }
    match buttons_component(draft) {
        Ok(Some(buttons)) => components.push(buttons),
        Ok(None) => {}
        Err(mut button_errors) => errors.append(&mut button_errors),
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let message_send_ttl_seconds = draft
        .category
        .has_message_ttl()
        .then(|| draft.effective_expire_seconds());

    tracing::debug!(
        template = %draft.name,
        category = %draft.category,
        components = components.len(),
        "Built vendor payload"
    );

    Ok(VendorPayload {
        name: draft.name.clone(),
        language: draft.language.clone(),
        category: draft.category.as_vendor_str().to_string(),
        components,
        message_send_ttl_seconds,
    })
}

fn examples(variables: &[Variable]) -> Vec<String> {
    variables.iter().map(Variable::example_value).collect()
}

fn header_component(draft: &TemplateDraft) -> Option<Component> {
    let header = &draft.header;
    match header.format {
        HeaderFormat::None => None,
        HeaderFormat::Text => Some(Component::Header {
            format: header.format,
            text: header.text.clone(),
            example: (!draft.header_variables.is_empty()).then(|| HeaderExample {
                header_text: Some(examples(&draft.header_variables)),
                header_handle: None,
            }),
        }),
        HeaderFormat::Image | HeaderFormat::Video | HeaderFormat::Document => {
            Some(Component::Header {
                format: header.format,
                text: None,
                example: header.media_handle.as_ref().map(|handle| HeaderExample {
                    header_text: None,
                    header_handle: Some(vec![handle.clone()]),
                }),
            })
        }
    }
}

fn body_component(draft: &TemplateDraft) -> Option<Component> {
    if draft.category == Category::Authentication {
        return Some(Component::Body {
            text: None,
            add_security_recommendation: Some(draft.authentication.add_security_recommendation),
            example: None,
        });
    }

    if draft.body.is_empty() {
        return None;
    }

    Some(Component::Body {
        text: Some(draft.body.replace("\\n", "\n")),
        add_security_recommendation: None,
        example: (!draft.body_variables.is_empty()).then(|| BodyExample {
            body_text: vec![examples(&draft.body_variables)],
        }),
    })
}

fn footer_component(draft: &TemplateDraft) -> Option<Component> {
    if draft.category == Category::Authentication && draft.authentication.code_expiration_enabled
    {
        return Some(Component::Footer {
            text: None,
            code_expiration_minutes: Some(draft.effective_expire_seconds() / 60),
        });
    }

    draft
        .footer
        .as_ref()
        .filter(|text| !text.is_empty())
        .map(|text| Component::Footer {
            text: Some(text.clone()),
            code_expiration_minutes: None,
        })
}

fn buttons_component(draft: &TemplateDraft) -> Result<Option<Component>, Vec<ValidationError>> {
    if draft.category == Category::Authentication {
        return Ok(Some(Component::Buttons {
            buttons: vec![VendorButton::otp_copy_code()],
        }));
    }

    if draft.buttons.is_empty() {
        return Ok(None);
    }

    let mut buttons = Vec::with_capacity(draft.buttons.len());
    let mut errors = Vec::new();
    for button in &draft.buttons {
        match vendor_button(button) {
            Ok(vendor) => buttons.push(vendor),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(Some(Component::Buttons { buttons }))
    } else {
        Err(errors)
    }
}

/// Map a draft button to its vendor shape.
pub fn vendor_button(button: &Button) -> Result<VendorButton, ValidationError> {
    let vendor = match button {
        Button::QuickReply { text } | Button::MarketingOptOut { text } => {
            VendorButton::new("QUICK_REPLY", Some(text))
        }
        Button::PhoneNumber {
            text,
            country_code,
            phone_digits,
        } => VendorButton {
            phone_number: Some(format!("+{}{}", country_code, phone_digits)),
            ..VendorButton::new("PHONE_NUMBER", Some(text))
        },
        Button::Url { text, url, .. } => VendorButton {
            url: Some(url.clone()),
            ..VendorButton::new("URL", Some(text))
        },
        Button::CopyCode { offer_code } => VendorButton {
            example: Some(ButtonExample::Single(offer_code.clone())),
            ..VendorButton::new("COPY_CODE", None)
        },
        Button::Flow { text, flow_id } => {
            let flow_id = flow_id
                .clone()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ValidationError::MissingFlowId { text: text.clone() })?;
            VendorButton {
                flow_id: Some(flow_id),
                flow_action: Some("navigate".to_string()),
                ..VendorButton::new("FLOW", Some(text))
            }
        }
        Button::Catalog { text } => VendorButton::new("CATALOG", Some(text)),
        Button::Mpm { text } => VendorButton::new("MPM", Some(text)),
        Button::Otp { .. } => {
            return Err(ValidationError::UnsupportedButton {
                kind: button.kind(),
            })
        }
    };

    Ok(vendor)
}
