//! Submission payload validation.
//!
//! Operates on an already-decoded JSON mapping; the wire encoding
//! (JSON body vs form) is the router's concern, not this module's.

use serde_json::{Map, Value};

/// A contact-form field the relay knows about.
///
/// Keys are case-sensitive exact matches against the payload. Labels are
/// what error messages show to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    PhoneNumber,
    Message,
    Subject,
    RecaptchaToken,
}

impl Field {
    /// Payload key for this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::Message => "message",
            Field::Subject => "subject",
            Field::RecaptchaToken => "recaptchaToken",
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::PhoneNumber => "phone number",
            Field::Message => "message",
            Field::Subject => "subject",
            Field::RecaptchaToken => "recaptchaToken",
        }
    }
}

/// The fixed priority order in which required fields are checked.
/// The first missing field determines the reported error.
pub const BASE_FIELDS: [Field; 4] = [
    Field::Email,
    Field::PhoneNumber,
    Field::Message,
    Field::Subject,
];

/// First-missing-field validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No {} defined", .0.label())]
pub struct MissingField(pub Field);

/// A submission that passed validation. All four base fields are
/// guaranteed present and non-empty; the token is present whenever
/// verification was part of the required list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub email: String,
    pub phone_number: String,
    pub message: String,
    pub subject: String,
    pub recaptcha_token: Option<String>,
}

/// Check `payload` against `required`, in order, reporting the first
/// missing field only (never an aggregate of all failures).
///
/// A field is missing when its key is absent, its value is null, not a
/// string, or an empty string.
pub fn validate(
    payload: &Map<String, Value>,
    required: &[Field],
) -> Result<ValidatedSubmission, MissingField> {
    for &field in required {
        if field_value(payload, field).is_none() {
            return Err(MissingField(field));
        }
    }

    // The pipeline always requires the base fields, so these lookups
    // cannot fail past the loop above; report the field rather than
    // panic if a caller ever passes a shorter list.
    let require = |field: Field| {
        field_value(payload, field)
            .map(str::to_owned)
            .ok_or(MissingField(field))
    };

    Ok(ValidatedSubmission {
        email: require(Field::Email)?,
        phone_number: require(Field::PhoneNumber)?,
        message: require(Field::Message)?,
        subject: require(Field::Subject)?,
        recaptcha_token: field_value(payload, Field::RecaptchaToken).map(str::to_owned),
    })
}

/// Extract a field as a non-empty string, or `None` if it is missing.
fn field_value(payload: &Map<String, Value>, field: Field) -> Option<&str> {
    match payload.get(field.key()) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn complete_payload() -> Map<String, Value> {
        payload(&[
            ("email", json!("a@b.com")),
            ("phoneNumber", json!("555")),
            ("message", json!("hi")),
            ("subject", json!("hello")),
        ])
    }

    #[test]
    fn complete_payload_validates() {
        let submission = validate(&complete_payload(), &BASE_FIELDS).unwrap();
        assert_eq!(submission.email, "a@b.com");
        assert_eq!(submission.phone_number, "555");
        assert_eq!(submission.message, "hi");
        assert_eq!(submission.subject, "hello");
        assert_eq!(submission.recaptcha_token, None);
    }

    #[test]
    fn missing_subject_reports_subject() {
        let mut p = complete_payload();
        p.remove("subject");
        let err = validate(&p, &BASE_FIELDS).unwrap_err();
        assert_eq!(err, MissingField(Field::Subject));
        assert_eq!(err.to_string(), "No subject defined");
    }

    #[test]
    fn first_missing_field_wins() {
        // Both email and subject missing — only email is reported.
        let p = payload(&[("phoneNumber", json!("555")), ("message", json!("hi"))]);
        let err = validate(&p, &BASE_FIELDS).unwrap_err();
        assert_eq!(err, MissingField(Field::Email));
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mut p = complete_payload();
        p.insert("phoneNumber".into(), json!(""));
        let err = validate(&p, &BASE_FIELDS).unwrap_err();
        assert_eq!(err.to_string(), "No phone number defined");
    }

    #[test]
    fn null_counts_as_missing() {
        let mut p = complete_payload();
        p.insert("message".into(), Value::Null);
        assert_eq!(
            validate(&p, &BASE_FIELDS).unwrap_err(),
            MissingField(Field::Message)
        );
    }

    #[test]
    fn non_string_counts_as_missing() {
        let mut p = complete_payload();
        p.insert("email".into(), json!(42));
        assert_eq!(
            validate(&p, &BASE_FIELDS).unwrap_err(),
            MissingField(Field::Email)
        );
    }

    #[test]
    fn token_required_when_listed() {
        let required = [
            Field::Email,
            Field::PhoneNumber,
            Field::Message,
            Field::Subject,
            Field::RecaptchaToken,
        ];
        let err = validate(&complete_payload(), &required).unwrap_err();
        assert_eq!(err, MissingField(Field::RecaptchaToken));
        assert_eq!(err.to_string(), "No recaptchaToken defined");
    }

    #[test]
    fn token_captured_when_present() {
        let mut p = complete_payload();
        p.insert("recaptchaToken".into(), json!("tok-123"));
        let submission = validate(&p, &BASE_FIELDS).unwrap();
        assert_eq!(submission.recaptcha_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut p = complete_payload();
        p.insert("unexpected".into(), json!("whatever"));
        assert!(validate(&p, &BASE_FIELDS).is_ok());
    }
}
