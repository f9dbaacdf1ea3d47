//! Schema validation for structured API records.
//!
//! [`validate_record`] is a pure function over a loosely typed JSON value.
//! It checks every field of the upstream schema, collects all violations,
//! and only returns an [`ApiRecord`] when the whole record is valid.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

/// A structured API record that passed validation.
///
/// Only the timestamps, names and descriptions reach the canonical event;
/// the remaining fields are validated so that upstream shape drift fails
/// loudly instead of silently.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRecord {
    pub id: f64,
    pub starts: DateTime<FixedOffset>,
    pub ends: DateTime<FixedOffset>,
    pub signup_starts: Option<DateTime<FixedOffset>>,
    pub signup_ends: Option<DateTime<FixedOffset>>,
    pub name_fi: String,
    pub name_en: String,
    pub description_fi: String,
    pub description_en: Option<String>,
    pub location_fi: String,
    pub location_en: String,
    pub max_attendees: f64,
    pub reserve_spots: bool,
    pub group: String,
    pub signup: bool,
    pub participants_public: bool,
    pub email: bool,
    pub email_required: bool,
    pub email_public: bool,
    pub phone: bool,
    pub phone_required: bool,
    pub phone_public: bool,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Name of the offending field, or `"(record)"` for the record itself.
    pub field: &'static str,
    /// What the schema expects there.
    pub expected: &'static str,
    /// What was found instead.
    pub found: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.field, self.expected, self.found
        )
    }
}

/// A record that does not match the structured API schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Returns every violation found in the record.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Returns true if the given field has a violation.
    pub fn has_issue_for(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schema violation(s): ", self.issues.len())?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    /// Must be present and non-null.
    Required,
    /// Must be present, may be null.
    Nullable,
    /// May be missing, must not be null.
    Optional,
}

const TIMESTAMP: &str = "timestamp with offset";
const STRING: &str = "string";
const NUMBER: &str = "number";
const BOOLEAN: &str = "boolean";

/// Parses an ISO 8601 timestamp that carries an explicit offset.
pub fn parse_offset_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

struct RecordReader<'a> {
    object: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> RecordReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            issues: Vec::new(),
        }
    }

    fn read<T>(
        &mut self,
        field: &'static str,
        presence: Presence,
        expected: &'static str,
        extract: fn(&Value) -> Option<T>,
    ) -> Option<T> {
        match self.object.get(field) {
            None => {
                if presence != Presence::Optional {
                    self.issue(field, expected, "missing".to_string());
                }
                None
            }
            Some(Value::Null) => {
                if presence != Presence::Nullable {
                    self.issue(field, expected, "null".to_string());
                }
                None
            }
            Some(value) => {
                let extracted = extract(value);
                if extracted.is_none() {
                    self.issue(field, expected, describe(value));
                }
                extracted
            }
        }
    }

    fn issue(&mut self, field: &'static str, expected: &'static str, found: String) {
        self.issues.push(ValidationIssue {
            field,
            expected,
            found,
        });
    }

    fn timestamp(&mut self, field: &'static str) -> DateTime<FixedOffset> {
        self.read(field, Presence::Required, TIMESTAMP, as_timestamp)
            .unwrap_or_default()
    }

    fn nullable_timestamp(&mut self, field: &'static str) -> Option<DateTime<FixedOffset>> {
        self.read(field, Presence::Nullable, TIMESTAMP, as_timestamp)
    }

    fn string(&mut self, field: &'static str) -> String {
        self.read(field, Presence::Required, STRING, as_string)
            .unwrap_or_default()
    }

    fn nullable_string(&mut self, field: &'static str) -> Option<String> {
        self.read(field, Presence::Nullable, STRING, as_string)
    }

    fn optional_string(&mut self, field: &'static str) -> Option<String> {
        self.read(field, Presence::Optional, STRING, as_string)
    }

    fn number(&mut self, field: &'static str) -> f64 {
        self.read(field, Presence::Required, NUMBER, Value::as_f64)
            .unwrap_or_default()
    }

    fn boolean(&mut self, field: &'static str) -> bool {
        self.read(field, Presence::Required, BOOLEAN, Value::as_bool)
            .unwrap_or_default()
    }

    fn finish(self, record: ApiRecord) -> Result<ApiRecord, ValidationError> {
        if self.issues.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }
}

fn as_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    value.as_str().and_then(parse_offset_timestamp)
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Validates one loosely typed record against the structured API schema.
///
/// Unknown fields are ignored. All violations are reported together.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every field that is missing, null
/// where null is not allowed, or of the wrong type.
pub fn validate_record(value: &Value) -> Result<ApiRecord, ValidationError> {
    let Some(object) = value.as_object() else {
        return Err(ValidationError {
            issues: vec![ValidationIssue {
                field: "(record)",
                expected: "object",
                found: describe(value),
            }],
        });
    };

    let mut r = RecordReader::new(object);
    let record = ApiRecord {
        starts: r.timestamp("starts"),
        ends: r.timestamp("ends"),
        signup_starts: r.nullable_timestamp("signup_starts"),
        signup_ends: r.nullable_timestamp("signup_ends"),
        id: r.number("id"),
        name_fi: r.string("name_fi"),
        name_en: r.string("name_en"),
        description_fi: r.string("description_fi"),
        description_en: r.nullable_string("description_en"),
        location_fi: r.string("location_fi"),
        location_en: r.string("location_en"),
        max_attendees: r.number("max_attendees"),
        reserve_spots: r.boolean("reserve_spots"),
        group: r.string("group"),
        signup: r.boolean("signup"),
        participants_public: r.boolean("participants_public"),
        email: r.boolean("email"),
        email_required: r.boolean("email_required"),
        email_public: r.boolean("email_public"),
        phone: r.boolean("phone"),
        phone_required: r.boolean("phone_required"),
        phone_public: r.boolean("phone_public"),
        created: r.optional_string("created"),
        modified: r.optional_string("modified"),
    };
    r.finish(record)
}
