//! Derived artifact tracking.
//!
//! Holds the last submitted snapshot and the vCard derived from it, and
//! answers two independent staleness questions:
//!
//! - **Form drift**: the live form no longer equals the submitted snapshot.
//! - **Manual edit**: the vCard text was edited directly and differs from the
//!   serializer output.

use crate::form::{ContactForm, ContactSnapshot};
use crate::vcard;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOTICE_TITLE: &str = "Notice!";

/// Staleness notice shown above the QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    FormDrift,
    ManualEdit,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Self::FormDrift => {
                "The content of the vCard and QR code is different from the form data. \
                 You can set them to the form content using the update button."
            }
            Self::ManualEdit => {
                "The vCard has been edited manually. You can set it to the form content \
                 using the update button."
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", NOTICE_TITLE, self.message())
    }
}

/// Label of the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmitLabel {
    #[default]
    Create,
    Update,
}

impl SubmitLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
        }
    }
}

impl fmt::Display for SubmitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactTracker {
    submitted: Option<ContactSnapshot>,
    /// Serializer output for `submitted`.
    original: String,
    /// What is displayed and encoded; equals `original` unless edited.
    current: String,
    edited: bool,
}

impl ArtifactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot, re-derive the vCard and drop any manual edit.
    /// Returns the new vCard text.
    pub fn record_submission(&mut self, snapshot: ContactSnapshot) -> &str {
        self.original = vcard::serialize(&snapshot);
        self.current.clone_from(&self.original);
        self.submitted = Some(snapshot);
        self.edited = false;
        tracing::debug!(bytes = self.current.len(), "vcard derived from submission");
        &self.current
    }

    /// Apply a direct edit of the vCard text.
    ///
    /// Line endings are normalized first. Text equal to the original restores
    /// it (a no-op when nothing was edited). Returns whether the displayed
    /// vCard changed.
    pub fn edit_vcard(&mut self, text: &str) -> bool {
        if self.submitted.is_none() {
            tracing::warn!("ignoring vcard edit before first submission");
            return false;
        }
        let normalized = vcard::normalize_line_endings(text);
        if normalized == self.original {
            if !self.edited {
                return false;
            }
            self.reset_to_original();
            return true;
        }
        let changed = normalized != self.current;
        self.current = normalized;
        self.edited = self.current != self.original;
        changed
    }

    /// Restore the serializer output and clear the edited flag.
    pub fn reset_to_original(&mut self) {
        self.current.clone_from(&self.original);
        self.edited = false;
    }

    /// Forget everything (form reset).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn submitted(&self) -> Option<&ContactSnapshot> {
        self.submitted.as_ref()
    }

    pub fn vcard(&self) -> &str {
        &self.current
    }

    pub fn original_vcard(&self) -> &str {
        &self.original
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    /// A vCard (and therefore a QR code) currently exists.
    pub fn has_artifact(&self) -> bool {
        !self.current.is_empty()
    }

    pub fn submit_label(&self) -> SubmitLabel {
        if self.submitted.is_some() {
            SubmitLabel::Update
        } else {
            SubmitLabel::Create
        }
    }

    pub fn form_drift(&self, live: &ContactForm) -> bool {
        self.submitted
            .as_ref()
            .is_some_and(|snapshot| !live.matches(snapshot))
    }

    /// All active notices, form drift first.
    pub fn notices(&self, live: &ContactForm) -> Vec<Notice> {
        let mut notices = Vec::with_capacity(2);
        if self.form_drift(live) {
            notices.push(Notice::FormDrift);
        }
        if self.edited {
            notices.push(Notice::ManualEdit);
        }
        notices
    }

    /// The single notice to display; a manual edit wins over form drift.
    pub fn primary_notice(&self, live: &ContactForm) -> Option<Notice> {
        if self.edited {
            Some(Notice::ManualEdit)
        } else if self.form_drift(live) {
            Some(Notice::FormDrift)
        } else {
            None
        }
    }
}
