//! Field normalization and format checks for extracted user info.
//!
//! Validation is shallow: it coerces types and checks that emails and phone
//! numbers look structurally plausible. It does not verify that the data is
//! real.

use once_cell::sync::Lazy;
use parley_core::UserRecord;
use regex::Regex;
use serde_json::Value;

use crate::parse::RawFields;
use crate::schema::{Field, FieldKind};

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^@ \t\r\n]+@[^@ \t\r\n]+\.[^@ \t\r\n]+").expect("Invalid email regex")
});

#[allow(clippy::expect_used)]
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d+\-\s()]{7,20}").expect("Invalid phone regex"));

/// A validation failure tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationIssue {
    /// `age` was present but not coercible to an integer
    AgeInvalidInt,
    /// `email` was present but malformed
    BadEmail,
    /// `phone` was present but malformed
    BadPhone,
}

impl ValidationIssue {
    /// The tag string reported to callers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgeInvalidInt => "age invalid int",
            Self::BadEmail => "bad email",
            Self::BadPhone => "bad phone",
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Issues in schema field order.
    pub errors: Vec<ValidationIssue>,
    pub normalized: UserRecord,
}

impl Validation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn has(&self, issue: ValidationIssue) -> bool {
        self.errors.contains(&issue)
    }

    /// Error tags as strings, in order.
    #[must_use]
    pub fn error_tags(&self) -> Vec<&'static str> {
        self.errors.iter().map(|e| e.as_str()).collect()
    }
}

/// Normalize and check every schema field of `fields`.
#[must_use]
pub fn validate_extraction(fields: &RawFields) -> Validation {
    let mut validation = Validation::default();

    for field in Field::ALL {
        let raw = fields.get(field.key());
        match field.kind() {
            FieldKind::Integer => {
                let age = match raw {
                    None | Some(Value::Null) => None,
                    Some(value) => {
                        let coerced = coerce_int(value);
                        if coerced.is_none() {
                            validation.errors.push(ValidationIssue::AgeInvalidInt);
                        }
                        coerced
                    }
                };
                validation.normalized.age = age;
            }
            FieldKind::String => {
                let text = raw.and_then(coerce_text);
                match (field, text.as_deref()) {
                    (Field::Email, Some(email)) if !EMAIL_PATTERN.is_match(email) => {
                        validation.errors.push(ValidationIssue::BadEmail);
                    }
                    (Field::Phone, Some(phone)) if !PHONE_PATTERN.is_match(phone) => {
                        validation.errors.push(ValidationIssue::BadPhone);
                    }
                    _ => {}
                }
                set_text(&mut validation.normalized, field, text);
            }
        }
    }

    validation
}

fn set_text(record: &mut UserRecord, field: Field, text: Option<String>) {
    match field {
        Field::Name => record.name = text,
        Field::Email => record.email = text,
        Field::Phone => record.phone = text,
        Field::Location => record.location = text,
        Field::Age => {}
    }
}

/// Integer coercion: integers as-is, finite floats truncated toward zero,
/// booleans as 0/1, strings trimmed and parsed in base 10.
#[allow(clippy::cast_possible_truncation)]
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < 9.2e18)
                .map(|f| f.trunc() as i64)
        }),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text coercion: empty or falsy values are absent, strings are kept verbatim,
/// anything else uses its JSON rendering.
// Booleans and arrays keep JSON spelling: `true` and `["a"]`, never `True` or `['a']`.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}
