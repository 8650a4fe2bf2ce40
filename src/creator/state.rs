//! Creator state container and the read-only views derived from it.

use crate::artifacts::DownloadLinks;
use contact_form::{
    validate, ArtifactTracker, ContactForm, EntryId, Notice, PhoneEntry, PhoneErrorBoard,
    SubmitLabel, ValidationErrors, ValidationMode,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// SCROLL TARGETS
// =============================================================================

pub const VCARD_DISPLAY_ID: &str = "vcard-display";
pub const VCARD_EDITOR_ID: &str = "vcard-box";

/// Element the host should bring into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollTarget {
    Top,
    VCardDisplay,
    /// The editor also takes keyboard focus.
    VCardEditor,
    PhoneEntry(usize),
}

impl ScrollTarget {
    /// DOM-style id of the target; `None` for the page top.
    pub fn element_id(&self) -> Option<String> {
        match self {
            Self::Top => None,
            Self::VCardDisplay => Some(VCARD_DISPLAY_ID.to_string()),
            Self::VCardEditor => Some(VCARD_EDITOR_ID.to_string()),
            Self::PhoneEntry(index) => Some(format!("phone.{index}")),
        }
    }

    pub fn takes_focus(&self) -> bool {
        matches!(self, Self::VCardEditor | Self::PhoneEntry(_))
    }
}

// =============================================================================
// RESET CONFIRMATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetConfirmation {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl Default for ResetConfirmation {
    fn default() -> Self {
        Self {
            title: "Clear form?".to_string(),
            message: "The form will be cleared and the created vCard and QR code removed."
                .to_string(),
            confirm_label: "Clear".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

// =============================================================================
// CREATOR STATE
// =============================================================================

/// Everything one creator page knows. Owned by the `Creator`, never shared.
#[derive(Debug, Clone)]
pub struct CreatorState {
    pub form: ContactForm,
    /// Recomputed after every form change.
    pub errors: ValidationErrors,
    pub tracker: ArtifactTracker,
    pub phone_errors: PhoneErrorBoard,
    pub validation_mode: ValidationMode,
    pub submit_attempted: bool,
    pub scroll_target: Option<ScrollTarget>,
    pub editor_open: bool,
    pub reset_confirmation: Option<ResetConfirmation>,
}

impl CreatorState {
    pub fn new(validation_mode: ValidationMode, transient_error_ms: u64) -> Self {
        let form = ContactForm::new();
        let errors = validate(&form);
        Self {
            form,
            errors,
            tracker: ArtifactTracker::new(),
            phone_errors: PhoneErrorBoard::new(transient_error_ms),
            validation_mode,
            submit_attempted: false,
            scroll_target: None,
            editor_open: false,
            reset_confirmation: None,
        }
    }

    /// Re-run validation and drop transient errors of removed rows.
    pub fn revalidate(&mut self) {
        self.errors = validate(&self.form);
        self.phone_errors.retain_live(&self.form);
    }

    /// Errors the user should currently see.
    pub fn visible_errors(&self) -> ValidationErrors {
        if self.validation_mode.errors_visible(self.submit_attempted) {
            self.errors.clone()
        } else {
            ValidationErrors::new()
        }
    }

    /// Back to a fresh page, keeping the configured mode and timer window.
    pub fn reset(&mut self) {
        self.form.reset();
        self.tracker.clear();
        self.phone_errors.clear();
        self.submit_attempted = false;
        self.editor_open = false;
        self.reset_confirmation = None;
        self.scroll_target = Some(ScrollTarget::Top);
        self.errors = validate(&self.form);
    }

    pub fn form_view(&self) -> FormView {
        let show_preferred = self.form.len() > 1;
        let can_remove = self.form.can_remove();
        let phones = self
            .form
            .entries()
            .enumerate()
            .map(|(index, (id, entry))| PhoneRowView {
                index,
                id,
                entry: entry.clone(),
                show_preferred,
                can_remove,
                transient_error: self.phone_errors.message(id).map(str::to_string),
            })
            .collect();

        FormView {
            first_name: self.form.first_name().to_string(),
            last_name: self.form.last_name().to_string(),
            phones,
            errors: self.visible_errors(),
            submit_label: self.tracker.submit_label(),
        }
    }

    pub fn display_view(&self, links: Option<&DownloadLinks>) -> DisplayView {
        DisplayView {
            vcard: self.tracker.vcard().to_string(),
            notice: self.tracker.primary_notice(&self.form),
            edited: self.tracker.is_edited(),
            editor_open: self.editor_open,
            links: links.cloned(),
        }
    }
}

// =============================================================================
// VIEWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub first_name: String,
    pub last_name: String,
    pub phones: Vec<PhoneRowView>,
    pub errors: ValidationErrors,
    pub submit_label: SubmitLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneRowView {
    pub index: usize,
    pub id: EntryId,
    pub entry: PhoneEntry,
    /// The preferred checkbox is hidden while there is a single row.
    pub show_preferred: bool,
    pub can_remove: bool,
    pub transient_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayView {
    pub vcard: String,
    pub notice: Option<Notice>,
    pub edited: bool,
    pub editor_open: bool,
    pub links: Option<DownloadLinks>,
}

impl DisplayView {
    /// Full notice text including the title, if any notice is active.
    pub fn notice_text(&self) -> Option<String> {
        self.notice.map(|notice| notice.to_string())
    }
}
