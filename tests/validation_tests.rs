use chrono::NaiveDate;
use noteease_backend::model::{FieldKind, FieldSpec, FieldValue, FieldValues, FormKind};
use noteease_backend::validation::{
    sanitize_phone_input, validate_field, validate_field_on, validate_form, validate_form_on,
    FieldErrorCode, FormRegistry,
};

fn text(spec: &FieldSpec, value: &str) -> bool {
    validate_field(spec, Some(&FieldValue::text(spec.key, value))).valid
}

#[test]
fn test_email_format() {
    let spec = FieldSpec::new("email", "Email", FieldKind::Email);
    assert!(text(&spec, "a@b.co"));
    assert!(!text(&spec, "a@b"));
    assert!(!text(&spec, "a b@c.io"));
}

#[test]
fn test_phone_format() {
    let spec = FieldSpec::new("phone", "Phone", FieldKind::Phone);
    assert!(text(&spec, "9876543210"));
    assert!(!text(&spec, "1234567890"));
    assert!(!text(&spec, "98765432"));
    assert!(!text(&spec, "98765432101"));
}

#[test]
fn test_required_whitespace_is_missing_for_every_kind() {
    let kinds = [
        FieldKind::PlainText,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Password,
        FieldKind::Pincode,
        FieldKind::Url,
        FieldKind::Username,
        FieldKind::Number,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::TextArea,
    ];
    for kind in kinds {
        let spec = FieldSpec::new("field", "Field", kind).required();
        let result = validate_field(&spec, Some(&FieldValue::text("field", "   \t")));
        assert!(!result.valid, "{:?} accepted whitespace", kind);
        assert_eq!(result.code, Some(FieldErrorCode::MissingRequired));
        assert_eq!(result.message.as_deref(), Some("Field is required"));
    }
}

#[test]
fn test_revalidation_is_idempotent() {
    let registry = FormRegistry::default();
    let values = FieldValues::new()
        .with_text("name", "Ravi Kumar")
        .with_text("phone", "12345")
        .with_text("address", "12 MG Road, Pune")
        .with_text("message", "short")
        .with_text("deadline", "2020-01-01");
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    let specs = registry.specs(FormKind::GenericRequest);
    let first = validate_form_on(specs, &values, today);
    let second = validate_form_on(specs, &values, today);
    assert_eq!(first, second);
    assert!(!first.valid);
}

#[test]
fn test_one_invalid_field_invalidates_form() {
    let mut specs = Vec::new();
    let mut values = FieldValues::new();
    for key in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
        specs.push(FieldSpec::new(key, "Field", FieldKind::Select).required());
        values = values.with_text(key, "chosen");
    }
    specs.push(FieldSpec::new("k", "Contact email", FieldKind::Email).required());
    values = values.with_text("k", "not-an-email");

    let validation = validate_form(&specs, &values);
    assert!(!validation.valid);
    assert_eq!(validation.field_results.len(), 11);
    assert_eq!(validation.errors().count(), 1);
    assert_eq!(validation.first_invalid().map(|r| r.field_key.as_str()), Some("k"));

    values = values.with_text("k", "me@example.com");
    assert!(validate_form(&specs, &values).valid);
}

#[test]
fn test_first_invalid_follows_declaration_order() {
    let registry = FormRegistry::default();
    let values = FieldValues::new().with_text("sample_link", "not a url");
    let validation = validate_form(registry.specs(FormKind::WriterApplication), &values);

    let invalid: Vec<&str> = validation.errors().map(|r| r.field_key.as_str()).collect();
    assert_eq!(invalid, vec!["name", "phone", "education", "motivation", "sample_link"]);
    assert_eq!(validation.first_invalid().unwrap().field_key, "name");
}

#[test]
fn test_deadline_today_is_allowed() {
    let spec = FieldSpec::new("deadline", "Deadline", FieldKind::Date).no_past_dates();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let on = |value: &str| validate_field_on(&spec, Some(&FieldValue::text("deadline", value)), today);

    assert!(on("2025-06-15").valid);
    assert_eq!(on("2025-06-14").code, Some(FieldErrorCode::DateInPast));
    assert_eq!(on("15/06/2025").code, Some(FieldErrorCode::InvalidFormat));
}

#[test]
fn test_phone_input_sanitising_matches_validator() {
    let spec = FieldSpec::new("phone", "Phone", FieldKind::Phone).required();
    let cleaned = sanitize_phone_input("+91 98765-43210");
    assert_eq!(cleaned, "9198765432");
    assert!(!text(&spec, &cleaned));
    assert!(text(&spec, &sanitize_phone_input("98765 43210")));
}
