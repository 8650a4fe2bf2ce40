//! Form validation.
//!
//! Runs on every change and once more, synchronously, at submit time:
//! 1. First name required (non-blank after trim)
//! 2. Last name required (non-blank after trim)
//! 3. At most one preferred phone row (reported on the phone list, not a row)
//!
//! Per-row number format errors come from the number input widget and live in
//! [`crate::transient`]; they never block submission and are not touched here.

use crate::form::ContactForm;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const FIRST_NAME_REQUIRED: &str = "First name is required.";
pub const LAST_NAME_REQUIRED: &str = "Last name is required.";
pub const SINGLE_PREFERRED: &str = "Only one phone number can be marked as preferred.";

/// Form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldPath {
    #[serde(rename = "firstName")]
    FirstName,
    #[serde(rename = "lastName")]
    LastName,
    /// The phone list as a whole.
    #[serde(rename = "phone")]
    Phone,
}

impl FieldPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required field left blank.
    Required,
    /// Rule spanning several rows (preferred count).
    CrossField,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

/// When errors become visible to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Errors show as soon as a change produces them.
    #[default]
    OnChange,
    /// Errors stay hidden until the first submit attempt, then track changes.
    OnSubmit,
}

impl ValidationMode {
    /// Whether errors should be shown given the submit history.
    pub fn errors_visible(&self, submit_attempted: bool) -> bool {
        match self {
            Self::OnChange => true,
            Self::OnSubmit => submit_attempted,
        }
    }
}

/// Field path → error. Empty means the form may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<FieldPath, FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every error this validator produces blocks submission.
    pub fn blocks_submit(&self) -> bool {
        !self.is_valid()
    }

    pub fn get(&self, path: FieldPath) -> Option<&FieldError> {
        self.errors.get(&path)
    }

    pub fn message(&self, path: FieldPath) -> Option<&str> {
        self.errors.get(&path).map(|e| e.message.as_str())
    }

    pub fn contains(&self, path: FieldPath) -> bool {
        self.errors.contains_key(&path)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldPath, &FieldError)> {
        self.errors.iter().map(|(path, error)| (*path, error))
    }

    pub fn set(&mut self, path: FieldPath, kind: ErrorKind, message: impl Into<String>) {
        self.errors.insert(
            path,
            FieldError {
                kind,
                message: message.into(),
            },
        );
    }

    pub fn clear(&mut self, path: FieldPath) {
        self.errors.remove(&path);
    }
}

/// Validate the live form.
pub fn validate(form: &ContactForm) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    // 1. Required names
    if form.first_name().trim().is_empty() {
        errors.set(FieldPath::FirstName, ErrorKind::Required, FIRST_NAME_REQUIRED);
    }
    if form.last_name().trim().is_empty() {
        errors.set(FieldPath::LastName, ErrorKind::Required, LAST_NAME_REQUIRED);
    }

    // 2. Preferred count
    validate_preferred(form, &mut errors);

    errors
}

fn validate_preferred(form: &ContactForm, errors: &mut ValidationErrors) {
    if form.preferred_count() > 1 {
        errors.set(FieldPath::Phone, ErrorKind::CrossField, SINGLE_PREFERRED);
    } else {
        errors.clear(FieldPath::Phone);
    }
}
