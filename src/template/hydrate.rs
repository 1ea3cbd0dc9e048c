//! Rebuild an editable draft from a template stored at the vendor.

use std::collections::BTreeSet;

use super::payload::{Component, HeaderExample, VendorButton, VendorPayload};
use super::substitution::{count_tokens, token_indices};
use super::types::{
    AuthenticationOptions, Button, Category, Header, HeaderFormat, TemplateDraft, TemplateError,
    TemplateResult, UrlType, Variable,
};

/// Label the vendor uses for marketing opt-out quick replies.
const OPT_OUT_LABEL: &str = "stop promotions";

impl TemplateDraft {
    /// Hydrate a draft from a vendor template (the submission shape, or the
    /// shape returned when listing approved templates).
    ///
    /// Variable bindings are not stored at the vendor: variables come back
    /// with empty `object`/`field` and the example values as alternate text.
    pub fn from_vendor(value: &serde_json::Value) -> TemplateResult<Self> {
        let payload: VendorPayload = serde_json::from_value(value.clone())
            .map_err(|e| TemplateError::MalformedVendorTemplate(e.to_string()))?;

        let category = Category::from_vendor(&payload.category).ok_or_else(|| {
            TemplateError::MalformedVendorTemplate(format!(
                "unknown category: {}",
                payload.category
            ))
        })?;

        let mut draft = TemplateDraft::new(payload.name, payload.language, category);
        let mut code_expiration_minutes = None;

        for component in payload.components {
            match component {
                Component::Header {
                    format,
                    text,
                    example,
                } => {
                    let example = example.unwrap_or(HeaderExample {
                        header_text: None,
                        header_handle: None,
                    });
                    if format == HeaderFormat::Text {
                        let text = text.unwrap_or_default();
                        draft.header_variables =
                            variables_from_examples(&text, example.header_text.unwrap_or_default());
                        draft.header = Header::text(text);
                    } else {
                        let handle = example.header_handle.and_then(|h| h.into_iter().next());
                        draft.header = Header::media(format, handle);
                    }
                }
                Component::Body {
                    text,
                    add_security_recommendation,
                    example,
                } => {
                    let text = text.unwrap_or_default();
                    let examples = example
                        .and_then(|e| e.body_text.into_iter().next())
                        .unwrap_or_default();
                    draft.body_variables = variables_from_examples(&text, examples);
                    draft.body = text;
                    draft.authentication.add_security_recommendation =
                        add_security_recommendation.unwrap_or(false);
                }
                Component::Footer {
                    text,
                    code_expiration_minutes: minutes,
                } => {
                    draft.footer = text;
                    code_expiration_minutes = minutes;
                }
                Component::Buttons { buttons } => {
                    if category != Category::Authentication {
                        draft.buttons = buttons
                            .into_iter()
                            .map(|b| draft_button(b, category))
                            .collect::<TemplateResult<_>>()?;
                    }
                }
            }
        }

        draft.authentication = AuthenticationOptions {
            code_expiration_enabled: code_expiration_minutes.is_some(),
            ..draft.authentication
        };
        draft.expire_seconds = match (payload.message_send_ttl_seconds, code_expiration_minutes) {
            (Some(ttl), _) => Some(ttl),
            (None, Some(minutes)) => Some(minutes.checked_mul(60).ok_or_else(|| {
                TemplateError::MalformedVendorTemplate(format!(
                    "code_expiration_minutes out of range: {}",
                    minutes
                ))
            })?),
            (None, None) => None,
        };

        tracing::debug!(
            template = %draft.name,
            buttons = draft.buttons.len(),
            "Hydrated draft from vendor template"
        );

        Ok(draft)
    }
}

/// One variable per distinct token, alternate text taken positionally from
/// the vendor examples.
fn variables_from_examples(text: &str, examples: Vec<String>) -> Vec<Variable> {
    let indices: BTreeSet<u32> = token_indices(text).into_iter().collect();
    let count = indices.len().max(examples.len());
    let mut examples = examples.into_iter();

    (1..=count as u32)
        .map(|index| Variable {
            index,
            object: String::new(),
            field: String::new(),
            alternate_text: examples.next(),
        })
        .collect()
}

fn draft_button(button: VendorButton, category: Category) -> TemplateResult<Button> {
    let text = button.text.clone().unwrap_or_default();

    let draft = match button.kind.to_ascii_uppercase().as_str() {
        "QUICK_REPLY"
            if category == Category::Marketing && text.to_lowercase() == OPT_OUT_LABEL =>
        {
            Button::MarketingOptOut { text }
        }
        "QUICK_REPLY" => Button::QuickReply { text },
        "PHONE_NUMBER" => {
            let number = button.phone_number.unwrap_or_default();
            Button::PhoneNumber {
                text,
                country_code: String::new(),
                phone_digits: number.trim_start_matches('+').to_string(),
            }
        }
        "URL" => {
            let url = button.url.unwrap_or_default();
            // Dynamic URLs carry a suffix variable drafts cannot express
            if count_tokens(&url) > 0 {
                return Err(TemplateError::MalformedVendorTemplate(format!(
                    "dynamic URL buttons are not supported: {}",
                    url
                )));
            }
            Button::Url {
                text,
                url_type: UrlType::Static,
                url,
            }
        }
        "COPY_CODE" => Button::CopyCode {
            offer_code: button
                .example
                .as_ref()
                .and_then(|e| e.first())
                .unwrap_or_default()
                .to_string(),
        },
        "FLOW" => Button::Flow {
            text,
            flow_id: button.flow_id,
        },
        "CATALOG" => Button::Catalog { text },
        "MPM" => Button::Mpm { text },
        other => {
            return Err(TemplateError::MalformedVendorTemplate(format!(
                "unsupported button type: {}",
                other
            )))
        }
    };

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::payload::build;
    use serde_json::json;

    #[test]
    fn test_hydrate_approved_marketing_template() {
        let stored = json!({
            "name": "spring_sale",
            "language": "en_US",
            "category": "MARKETING",
            "status": "APPROVED",
            "id": "1234567890",
            "components": [
                {"type": "HEADER", "format": "TEXT", "text": "Hi {{1}}",
                 "example": {"header_text": ["John"]}},
                {"type": "BODY", "text": "Use {{1}} before {{2}}",
                 "example": {"body_text": [["SPRING", "Friday"]]}},
                {"type": "FOOTER", "text": "Reply STOP to opt out"},
                {"type": "BUTTONS", "buttons": [
                    {"type": "QUICK_REPLY", "text": "Stop promotions"},
                    {"type": "PHONE_NUMBER", "text": "Call", "phone_number": "+14155550100"},
                    {"type": "URL", "text": "Shop", "url": "https://example.com/spring"},
                    {"type": "COPY_CODE", "example": "SPRING10"}
                ]}
            ]
        });

        let draft = TemplateDraft::from_vendor(&stored).unwrap();

        assert_eq!(draft.category, Category::Marketing);
        assert_eq!(draft.header.text.as_deref(), Some("Hi {{1}}"));
        assert_eq!(draft.header_variables[0].alternate_text.as_deref(), Some("John"));
        assert_eq!(draft.body_variables.len(), 2);
        assert_eq!(draft.body_variables[1].alternate_text.as_deref(), Some("Friday"));
        assert_eq!(draft.footer.as_deref(), Some("Reply STOP to opt out"));
        assert!(matches!(draft.buttons[0], Button::MarketingOptOut { .. }));
        assert_eq!(
            draft.buttons[1],
            Button::phone_number("Call", "", "14155550100")
        );
        assert_eq!(
            draft.buttons[2],
            Button::url("Shop", "https://example.com/spring")
        );
        assert_eq!(
            draft.buttons[3],
            Button::CopyCode {
                offer_code: "SPRING10".to_string()
            }
        );
    }

    #[test]
    fn test_hydrate_authentication_template() {
        let stored = json!({
            "name": "login_code",
            "language": "en_US",
            "category": "AUTHENTICATION",
            "message_send_ttl_seconds": 600,
            "components": [
                {"type": "BODY", "add_security_recommendation": true},
                {"type": "FOOTER", "code_expiration_minutes": 10},
                {"type": "BUTTONS", "buttons": [
                    {"type": "OTP", "text": "Verify Code", "otp_type": "COPY_CODE"}
                ]}
            ]
        });

        let draft = TemplateDraft::from_vendor(&stored).unwrap();
        assert!(draft.buttons.is_empty());
        assert!(draft.authentication.add_security_recommendation);
        assert!(draft.authentication.code_expiration_enabled);
        assert_eq!(draft.expire_seconds, Some(600));

        // hydrated drafts build back to the same shape
        let rebuilt = serde_json::to_value(build(&draft).unwrap()).unwrap();
        assert_eq!(rebuilt["components"], stored["components"]);
    }

    #[test]
    fn test_hydrate_rejects_unknown_category() {
        let stored = json!({"name": "x", "language": "en", "category": "PROMO", "components": []});
        assert!(matches!(
            TemplateDraft::from_vendor(&stored),
            Err(TemplateError::MalformedVendorTemplate(_))
        ));
    }

    #[test]
    fn test_hydrate_rejects_unknown_button() {
        let stored = json!({
            "name": "x", "language": "en", "category": "UTILITY",
            "components": [
                {"type": "BODY", "text": "hi"},
                {"type": "BUTTONS", "buttons": [{"type": "VOICE_CALL", "text": "Call"}]}
            ]
        });
        assert!(TemplateDraft::from_vendor(&stored).is_err());
    }

    #[test]
    fn test_hydrate_rejects_dynamic_url_button() {
        let stored = json!({
            "name": "spring_sale", "language": "en_US", "category": "MARKETING",
            "components": [
                {"type": "BODY", "text": "Sale is on"},
                {"type": "BUTTONS", "buttons": [
                    {"type": "URL", "text": "Shop", "url": "https://example.com/{{1}}",
                     "example": ["https://example.com/spring"]}
                ]}
            ]
        });
        assert!(matches!(
            TemplateDraft::from_vendor(&stored),
            Err(TemplateError::MalformedVendorTemplate(_))
        ));
    }

    #[test]
    fn test_hydrate_rejects_overflowing_code_expiration() {
        let stored = json!({
            "name": "login_code", "language": "en_US", "category": "AUTHENTICATION",
            "components": [
                {"type": "BODY", "add_security_recommendation": false},
                {"type": "FOOTER", "code_expiration_minutes": 4294967295u32}
            ]
        });
        assert!(matches!(
            TemplateDraft::from_vendor(&stored),
            Err(TemplateError::MalformedVendorTemplate(_))
        ));

        let stored = json!({
            "name": "login_code", "language": "en_US", "category": "AUTHENTICATION",
            "components": [
                {"type": "BODY"},
                {"type": "FOOTER", "code_expiration_minutes": 5}
            ]
        });
        let draft = TemplateDraft::from_vendor(&stored).unwrap();
        assert_eq!(draft.expire_seconds, Some(300));
    }
}
