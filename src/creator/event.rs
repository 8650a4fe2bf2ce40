//! Creator events and commands.
//!
//! The host emits [`CreatorEvent`]s instead of mutating state directly.
//! `Creator::handle_event` applies them and returns [`CreatorCommand`]s for the
//! host to carry out (scrolling, focus, dialogs, timers, links).

use super::state::{ResetConfirmation, ScrollTarget};
use crate::artifacts::DownloadLinks;
use crate::error::RenderError;
use contact_form::{ContactSnapshot, EntryId, PhoneEntryPatch, TimerTicket, ValidationErrors};

// =============================================================================
// CREATOR EVENT - User Intent
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CreatorEvent {
    // -------------------------------------------------------------------------
    // Form Events
    // -------------------------------------------------------------------------
    SetFirstName(String),

    SetLastName(String),

    /// Insert a default entry at `index` (may equal the list length).
    InsertPhone { index: usize },

    RemovePhone { index: usize },

    UpdatePhone { index: usize, patch: PhoneEntryPatch },

    /// Submit button pressed
    Submit,

    /// Reset button pressed; may open the confirmation dialog instead
    Reset,

    ConfirmReset,

    CancelReset,

    // -------------------------------------------------------------------------
    // vCard Editor Events
    // -------------------------------------------------------------------------
    OpenVCardEditor,

    CloseVCardEditor,

    /// Direct edit of the vCard text
    EditVCard(String),

    /// Restore the serializer output
    ResetVCard,

    // -------------------------------------------------------------------------
    // Transient Errors
    // -------------------------------------------------------------------------
    /// Format problem reported by the number input widget
    PhoneInputError {
        index: usize,
        message: String,
        now_ms: u64,
    },

    /// A timer scheduled via `CreatorCommand::ScheduleTimer` fired
    PhoneErrorExpired { id: EntryId, ticket: TimerTicket },

    /// Clock tick for hosts that poll instead of scheduling timers
    Tick { now_ms: u64 },
}

// =============================================================================
// CREATOR COMMAND - Host Side Effects
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CreatorCommand {
    ScrollTo(ScrollTarget),

    /// Move keyboard focus into the entry at `index`
    FocusPhoneEntry { index: usize },

    ShowResetConfirmation(ResetConfirmation),

    /// Submit was rejected; errors must be shown even in on-submit mode
    ShowValidationErrors(ValidationErrors),

    /// Call back with `PhoneErrorExpired` at `ticket.deadline_ms`
    ScheduleTimer { id: EntryId, ticket: TimerTicket },

    /// New download links; all previous links are revoked
    ArtifactsUpdated(DownloadLinks),

    /// All download links were revoked and none replace them
    ArtifactsCleared,

    /// The QR code could not be rendered; the previous state is kept
    ShowRenderError(RenderError),
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The snapshot became the new truth for the displayed artifacts.
    Accepted {
        snapshot: ContactSnapshot,
        links: Option<DownloadLinks>,
    },
    /// Validation blocked the submit; artifacts are untouched.
    Rejected(ValidationErrors),
    /// The contact is valid but its vCard could not be rendered (usually
    /// too long for a QR code). Nothing was committed.
    RenderFailed(RenderError),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
