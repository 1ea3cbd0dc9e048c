//! WYSIWYG preview of a draft, optionally resolved against a sample record.

use serde::Serialize;

use super::formatter::{format_text, format_text_unescaped};
use super::substitution::substitute;
use super::types::{
    Button, ButtonKind, Category, FieldValues, HeaderFormat, TemplateDraft, OTP_BUTTON_LABEL,
};

/// Code shown in Authentication previews.
const SAMPLE_OTP_CODE: &str = "123456";

/// Rendered header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PreviewHeader {
    Text {
        html: String,
    },
    Media {
        format: HeaderFormat,
        #[serde(skip_serializing_if = "Option::is_none")]
        handle: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewButton {
    pub label: String,
    pub kind: ButtonKind,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A rendered preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PreviewHeader>,
    pub body_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_html: Option<String>,
    pub buttons: Vec<PreviewButton>,
}

/// Fixed icon per button kind.
pub fn button_icon(kind: ButtonKind) -> &'static str {
    match kind {
        ButtonKind::QuickReply | ButtonKind::MarketingOptOut => "utility:reply",
        ButtonKind::PhoneNumber => "utility:call",
        ButtonKind::Url => "utility:new_window",
        ButtonKind::CopyCode | ButtonKind::Otp => "utility:copy",
        ButtonKind::Flow => "utility:flow",
        ButtonKind::Catalog | ButtonKind::Mpm => "utility:product",
    }
}

/// Renders previews with or without HTML escaping.
#[derive(Debug, Clone, Copy)]
pub struct PreviewRenderer {
    escape_html: bool,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PreviewRenderer {
    pub fn new(escape_html: bool) -> Self {
        Self { escape_html }
    }

    fn format(&self, text: &str) -> String {
        if self.escape_html {
            format_text(text)
        } else {
            format_text_unescaped(text)
        }
    }

    /// Render the draft. `values == None` renders every variable with its
    /// alternate text.
    pub fn render(&self, draft: &TemplateDraft, values: Option<&FieldValues>) -> Preview {
        let header = match draft.header.format {
            HeaderFormat::None => None,
            HeaderFormat::Text => {
                let text = substitute(
                    draft.header.text.as_deref().unwrap_or_default(),
                    &draft.header_variables,
                    values,
                );
                Some(PreviewHeader::Text {
                    html: self.format(&text),
                })
            }
            format => Some(PreviewHeader::Media {
                format,
                handle: draft.header.media_handle.clone(),
            }),
        };

        if draft.category == Category::Authentication {
            return self.render_authentication(draft, header);
        }

        let body = substitute(&draft.body.replace("\\n", "\n"), &draft.body_variables, values);
        let buttons = draft
            .buttons
            .iter()
            .map(|button| PreviewButton {
                detail: button_detail(button),
                ..preview_button(button.label(), button.kind())
            })
            .collect();

        Preview {
            header,
            body_html: self.format(&body),
            footer_html: draft
                .footer
                .as_deref()
                .filter(|f| !f.is_empty())
                .map(|f| self.format(f)),
            buttons,
        }
    }

    /// Authentication text is generated by the vendor; mirror it.
    fn render_authentication(&self, draft: &TemplateDraft, header: Option<PreviewHeader>) -> Preview {
        let mut body = format!("*{}* is your verification code.", SAMPLE_OTP_CODE);
        if draft.authentication.add_security_recommendation {
            body.push_str(" For your security, do not share this code.");
        }

        let footer = draft.authentication.code_expiration_enabled.then(|| {
            format!(
                "This code expires in {} minutes.",
                draft.effective_expire_seconds() / 60
            )
        });

        Preview {
            header,
            body_html: self.format(&body),
            footer_html: footer.map(|f| self.format(&f)),
            buttons: vec![preview_button(OTP_BUTTON_LABEL, ButtonKind::Otp)],
        }
    }
}

fn preview_button(label: &str, kind: ButtonKind) -> PreviewButton {
    PreviewButton {
        label: label.to_string(),
        kind,
        icon: button_icon(kind),
        detail: None,
    }
}

/// Kind-specific detail line for a button, e.g. the dialled number.
pub fn button_detail(button: &Button) -> Option<String> {
    match button {
        Button::PhoneNumber {
            country_code,
            phone_digits,
            ..
        } => Some(format!("+{}{}", country_code, phone_digits)),
        Button::Url { url, .. } => Some(url.clone()),
        Button::CopyCode { offer_code } => Some(offer_code.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::types::{Header, Variable};

    fn draft() -> TemplateDraft {
        TemplateDraft {
            header: Header::text("Hi *{{1}}*"),
            header_variables: vec![
                Variable::new(1, "Contact", "FirstName").with_alternate_text("John")
            ],
            body: "Order {{1}}\\nships {{2}}".to_string(),
            body_variables: vec![
                Variable::new(1, "Order", "Name").with_alternate_text("A-1"),
                Variable::new(2, "Order", "ShipDate").with_alternate_text("soon"),
            ],
            footer: Some("_Thanks_".to_string()),
            buttons: vec![
                Button::quick_reply("OK"),
                Button::url("Track", "https://example.com"),
            ],
            ..TemplateDraft::new("order_shipped", "en_US", Category::Utility)
        }
    }

    #[test]
    fn test_preview_with_alternate_text() {
        let preview = PreviewRenderer::default().render(&draft(), None);

        assert_eq!(
            preview.header,
            Some(PreviewHeader::Text {
                html: "Hi <b>John</b>".to_string()
            })
        );
        assert_eq!(preview.body_html, "Order A-1<br/>ships soon");
        assert_eq!(preview.footer_html.as_deref(), Some("<i>Thanks</i>"));
        assert_eq!(preview.buttons[0].icon, "utility:reply");
        assert_eq!(preview.buttons[1].icon, "utility:new_window");
        assert_eq!(
            preview.buttons[1].detail.as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn test_preview_with_record_values() {
        let mut values = FieldValues::new();
        values.insert("Contact.FirstName".to_string(), "Ana".to_string());
        values.insert("Order.Name".to_string(), "<B-2>".to_string());

        let preview = PreviewRenderer::new(true).render(&draft(), Some(&values));
        assert_eq!(
            preview.header,
            Some(PreviewHeader::Text {
                html: "Hi <b>Ana</b>".to_string()
            })
        );
        assert_eq!(preview.body_html, "Order &lt;B-2&gt;<br/>ships soon");
    }

    #[test]
    fn test_authentication_preview() {
        let mut d = TemplateDraft::new("login_code", "en_US", Category::Authentication);
        d.authentication.add_security_recommendation = true;
        d.authentication.code_expiration_enabled = true;
        d.buttons.push(Button::quick_reply("ignored"));

        let preview = PreviewRenderer::default().render(&d, None);
        assert!(preview.body_html.starts_with("<b>123456</b> is your verification code."));
        assert!(preview.body_html.ends_with("do not share this code."));
        assert_eq!(
            preview.footer_html.as_deref(),
            Some("This code expires in 5 minutes.")
        );
        assert_eq!(preview.buttons.len(), 1);
        assert_eq!(preview.buttons[0].label, "Verify Code");
    }

    #[test]
    fn test_media_header_and_details() {
        let d = TemplateDraft::new("promo", "en_US", Category::Marketing)
            .with_header(Header::media(HeaderFormat::Document, Some("4::h".to_string())))
            .with_body("See attached");

        let preview = PreviewRenderer::default().render(&d, None);
        assert_eq!(
            preview.header,
            Some(PreviewHeader::Media {
                format: HeaderFormat::Document,
                handle: Some("4::h".to_string())
            })
        );
        assert_eq!(
            button_detail(&Button::phone_number("Call", "1", "5550100")),
            Some("+15550100".to_string())
        );
    }
}
