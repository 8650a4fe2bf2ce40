//! Contact form core for the vCard QR creator.
//!
//! This crate holds everything that decides *what* the creator shows, with no
//! rendering, file system or timer dependencies:
//!
//! ```text
//! user edit ──► ContactForm ──► validate() ──► ValidationErrors
//!                    │
//!                 submit (valid)
//!                    ▼
//!             ContactSnapshot ──► vcard::serialize() ──► ArtifactTracker
//!                                                          │
//!                                       notices / submit label / vCard text
//! ```
//!
//! ## Rules
//!
//! 1. Phone entries are addressed by `EntryId` internally; indices only exist
//!    at the presentation boundary.
//! 2. Validation failures are data (`ValidationErrors`), never `Err`.
//! 3. Time is passed in as milliseconds; nothing here reads a clock.

mod error;
pub mod form;
pub mod phone;
pub mod tracker;
pub mod transient;
pub mod validate;
pub mod vcard;

pub use error::FormError;
pub use form::{ContactForm, ContactSnapshot, EntryId, InsertedEntry};
pub use phone::{PhoneEntry, PhoneEntryPatch, PhoneType};
pub use tracker::{ArtifactTracker, Notice, SubmitLabel, NOTICE_TITLE};
pub use transient::{PhoneErrorBoard, TimerTicket, TransientMessage};
pub use validate::{
    validate, ErrorKind, FieldError, FieldPath, ValidationErrors, ValidationMode,
    FIRST_NAME_REQUIRED, LAST_NAME_REQUIRED, SINGLE_PREFERRED,
};

/// Default lifetime of a transient phone-number error (milliseconds).
pub const DEFAULT_TRANSIENT_ERROR_MS: u64 = 3000;
