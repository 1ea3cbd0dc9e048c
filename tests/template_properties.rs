//! Template behaviour end to end
//!
//! These tests drive the public template API the way the HTTP layer does:
//! drafts in, payloads and previews out.

use std::collections::HashMap;

use serde_json::json;

use wa_template_service::template::{
    build, format_text, remove_variable, substitute, token_indices, AuthenticationOptions, Button,
    ButtonKind, Category, PreviewRenderer, TemplateDraft, TemplateSection, ValidationError,
    Variable,
};

fn contact(index: u32, field: &str) -> Variable {
    Variable::new(index, "Contact", field)
}

// ============================================================================
// Variable renumbering
// ============================================================================

#[test]
fn test_deleting_any_variable_renumbers_the_rest() {
    let text = "{{1}} / {{2}} / {{3}} / {{4}} / {{2}}";
    let vars = vec![
        contact(1, "FirstName"),
        contact(2, "LastName"),
        contact(3, "Email"),
        contact(4, "Phone"),
    ];

    for k in 1..=4u32 {
        let (new_text, new_vars) = remove_variable(text, &vars, k).unwrap();

        let labels: Vec<u32> = new_vars.iter().map(|v| v.index).collect();
        assert_eq!(labels, vec![1, 2, 3], "labels after removing {k}");

        // relative order of the survivors is kept
        let fields: Vec<&str> = new_vars.iter().map(|v| v.field.as_str()).collect();
        let expected: Vec<&str> = vars
            .iter()
            .filter(|v| v.index != k)
            .map(|v| v.field.as_str())
            .collect();
        assert_eq!(fields, expected);

        // every token points at a surviving variable
        for index in token_indices(&new_text) {
            assert!((1..=3).contains(&index), "stale token {index} in {new_text}");
        }
    }

    let (new_text, _) = remove_variable(text, &vars, 2).unwrap();
    assert_eq!(new_text, "{{1}} /  / {{2}} / {{3}} / ");
}

#[test]
fn test_deleting_unknown_variable_is_reported() {
    let vars = vec![contact(1, "FirstName")];
    assert!(remove_variable("Hi {{1}}", &vars, 5).is_none());

    let draft = TemplateDraft::new("greeting", "en_US", Category::Marketing).with_body("Hi");
    assert!(draft.remove_variable(TemplateSection::Body, 1).is_err());
}

// ============================================================================
// Substitution
// ============================================================================

#[test]
fn test_empty_variable_list_is_a_no_op() {
    let text = "Hello {{1}}, order {{2}} is *ready*";
    let values: HashMap<String, String> = HashMap::new();

    let once = substitute(text, &[], Some(&values));
    let twice = substitute(&once, &[], Some(&values));
    assert_eq!(once, text);
    assert_eq!(twice, once);
}

#[test]
fn test_repeated_body_tokens_all_replaced() {
    let vars = vec![contact(1, "FirstName")];
    let mut values = HashMap::new();
    values.insert("Contact.FirstName".to_string(), "X".to_string());

    let result = substitute("{{1}}, {{1}} and {{1}}", &vars, Some(&values));
    assert_eq!(result, "X, X and X");
}

// ============================================================================
// Button limits
// ============================================================================

#[test]
fn test_two_phone_buttons_fail_validation() {
    let mut draft =
        TemplateDraft::new("call_us", "en_US", Category::Marketing).with_body("Call us today");
    draft.buttons = vec![
        Button::phone_number("Call sales", "1", "5550100"),
        Button::phone_number("Call support", "1", "5550199"),
    ];

    let errors = build(&draft).unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ValidationError::ButtonLimitExceeded { count: 2, max: 1, .. }
    )));

    // the transition refuses the second one up front
    let draft = TemplateDraft::new("call_us", "en_US", Category::Marketing)
        .with_body("Call us today")
        .add_button(Button::phone_number("Call sales", "1", "5550100"))
        .unwrap();
    assert!(draft
        .add_button(Button::phone_number("Call support", "1", "5550199"))
        .is_err());
}

#[test]
fn test_stored_drafts_over_kind_limits_fail_validation() {
    let copy_code = |code: &str| Button::CopyCode {
        offer_code: code.to_string(),
    };
    let flow = |text: &str, id: &str| Button::Flow {
        text: text.to_string(),
        flow_id: Some(id.to_string()),
    };
    let opt_out = |text: &str| Button::MarketingOptOut {
        text: text.to_string(),
    };

    let cases = vec![
        (
            vec![copy_code("SAVE10"), copy_code("SAVE20")],
            ButtonKind::CopyCode,
        ),
        (vec![flow("Book", "1"), flow("Sign up", "2")], ButtonKind::Flow),
        (
            vec![opt_out("Stop promotions"), opt_out("Unsubscribe")],
            ButtonKind::MarketingOptOut,
        ),
        (
            vec![
                Button::url("Shop", "https://example.com/shop"),
                Button::url("Blog", "https://example.com/blog"),
                Button::url("Help", "https://example.com/help"),
            ],
            ButtonKind::Url,
        ),
    ];

    for (buttons, kind) in cases {
        let count = buttons.len();
        let mut draft =
            TemplateDraft::new("limits", "en_US", Category::Marketing).with_body("Hello");
        draft.buttons = buttons;

        let errors = build(&draft).unwrap_err();
        let max = kind.limit().unwrap();
        assert!(
            errors.contains(&ValidationError::ButtonLimitExceeded { kind, max, count }),
            "{kind}: {errors:?}"
        );
    }
}

#[test]
fn test_eleven_buttons_fail_validation() {
    let mut draft = TemplateDraft::new("many", "en_US", Category::Marketing).with_body("Pick one");
    draft.buttons = (1..=11)
        .map(|n| Button::quick_reply(format!("Option {n}")))
        .collect();

    let errors = build(&draft).unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::TooManyButtons { count: 11, max: 10 }]
    );
}

// ============================================================================
// Authentication
// ============================================================================

#[test]
fn test_authentication_buttons_are_always_the_otp_button() {
    let mut draft = TemplateDraft::new("login_code", "en_US", Category::Authentication);
    draft.authentication = AuthenticationOptions {
        add_security_recommendation: true,
        code_expiration_enabled: true,
    };
    draft.buttons = vec![
        Button::quick_reply("Yes"),
        Button::url("Visit", "https://example.com"),
    ];

    let payload = serde_json::to_value(build(&draft).unwrap()).unwrap();
    let buttons = payload["components"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["type"] == "BUTTONS")
        .unwrap();

    assert_eq!(
        buttons["buttons"],
        json!([{"type": "OTP", "text": "Verify Code", "otp_type": "COPY_CODE"}])
    );
    assert_eq!(payload["message_send_ttl_seconds"], 300);
}

// ============================================================================
// Payload shape
// ============================================================================

#[test]
fn test_welcome_msg_payload() {
    let draft: TemplateDraft = serde_json::from_value(json!({
        "name": "welcome_msg",
        "language": "en_US",
        "category": "Marketing",
        "header": {"format": "Text", "text": "Hi {{1}}"},
        "header_variables": [
            {"index": 1, "object": "Contact", "field": "FirstName", "alternate_text": "John"}
        ],
        "body": "Thanks for joining, {{1}}!",
        "body_variables": [
            {"index": 1, "object": "Contact", "field": "FirstName", "alternate_text": "John"}
        ],
        "footer": "Reply STOP to opt out",
        "buttons": []
    }))
    .unwrap();

    let payload = serde_json::to_value(build(&draft).unwrap()).unwrap();
    let components = payload["components"].as_array().unwrap();

    assert_eq!(payload["category"], "MARKETING");
    assert_eq!(components.len(), 3);
    assert_eq!(
        components[0],
        json!({
            "type": "HEADER",
            "format": "Text",
            "text": "Hi {{1}}",
            "example": {"header_text": ["John"]}
        })
    );
    assert_eq!(
        components[1],
        json!({
            "type": "BODY",
            "text": "Thanks for joining, {{1}}!",
            "example": {"body_text": [["John"]]}
        })
    );
    assert_eq!(
        components[2],
        json!({"type": "FOOTER", "text": "Reply STOP to opt out"})
    );
}

#[test]
fn test_vendor_template_hydrates_back_to_same_payload() {
    let draft = TemplateDraft::new("promo_code", "en_US", Category::Marketing)
        .with_body("Use the code below")
        .add_button(Button::CopyCode {
            offer_code: "SAVE20".to_string(),
        })
        .unwrap()
        .add_button(Button::url("Shop now", "https://shop.example.com"))
        .unwrap();

    let payload = build(&draft).unwrap();
    let hydrated = TemplateDraft::from_vendor(&serde_json::to_value(&payload).unwrap()).unwrap();

    assert_eq!(build(&hydrated).unwrap().components, payload.components);
}

// ============================================================================
// Formatting and preview
// ============================================================================

#[test]
fn test_format_markers() {
    assert_eq!(format_text("*a* _b_ ~c~"), "<b>a</b> <i>b</i> <s>c</s>");
}

#[test]
fn test_preview_matches_payload_substitution() {
    let draft = TemplateDraft::new("welcome_msg", "en_US", Category::Marketing)
        .with_body("Thanks for joining, ")
        .add_variable(
            TemplateSection::Body,
            "Contact",
            "FirstName",
            Some("John".to_string()),
        )
        .unwrap();

    let preview = PreviewRenderer::default().render(&draft, None);
    assert_eq!(preview.body_html, "Thanks for joining, John");

    let mut values = HashMap::new();
    values.insert("Contact.FirstName".to_string(), "<Ada>".to_string());
    let preview = PreviewRenderer::default().render(&draft, Some(&values));
    assert_eq!(preview.body_html, "Thanks for joining, &lt;Ada&gt;");
}
