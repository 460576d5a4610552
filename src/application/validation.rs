//! Field validation for member data entering the hierarchy.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const NAME_REQUIRED: &str = "The name field is required.";
pub const EMAIL_REQUIRED: &str = "The email field is required.";
pub const EMAIL_INVALID: &str = "The email must be a valid email address.";
pub const EMAILS_DUPLICATED: &str = "There are duplicate emails.";
pub const ID_INVALID: &str = "The id must be a valid identifier.";
pub const IDS_DUPLICATED: &str = "There are duplicate ids.";

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-message error, e.g. for structural checks.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Raw member fields as they arrive from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl MemberInput {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Check required fields and email format.
    pub fn validate(&self) -> FieldErrors {
        validate_fields(self.name.as_deref(), self.email.as_deref())
    }
}

pub fn validate_fields(name: Option<&str>, email: Option<&str>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if name.map_or(true, |n| n.trim().is_empty()) {
        errors.add("name", NAME_REQUIRED);
    }
    match email.map(str::trim) {
        None | Some("") => errors.add("email", EMAIL_REQUIRED),
        Some(e) if !is_valid_email(e) => errors.add("email", EMAIL_INVALID),
        Some(_) => {}
    }
    errors
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").unwrap())
        .is_match(email)
}
