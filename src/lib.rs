//! vCard QR creator.
//!
//! Collects a contact (name plus phone numbers), serializes it as a vCard 3.0
//! document and renders that document as a QR code with download links for
//! `vcard.vcf`, `qrcode.svg` and `qrcode.png`.
//!
//! The pure form/validation/serialization core lives in the `contact-form`
//! crate and is re-exported here. This crate adds the stateful creator, the
//! QR renderer, the download bridge and configuration.
//!
//! ## Features
//!
//! - `render` (default): [`render::QrCodeRenderer`] via `qrcode` + `image`
//! - `cli`: the `vcard_qr_cli` binary

pub mod artifacts;
pub mod config;
pub mod creator;
pub mod error;
pub mod render;

pub use contact_form::{
    self, vcard, ContactForm, ContactSnapshot, EntryId, FieldPath, Notice, PhoneEntry,
    PhoneEntryPatch, PhoneType, SubmitLabel, ValidationErrors, ValidationMode,
};

pub use artifacts::{DownloadBridge, DownloadLink, DownloadLinks, ObjectUrl, ObjectUrlRegistry};
pub use config::AppConfig;
pub use creator::{
    ContactPageCreator, Creator, CreatorCommand, CreatorEvent, CreatorMode, QrCodeCreator,
    SubmitOutcome,
};
pub use error::{ConfigError, RenderError, Result, VcardQrError};
pub use render::{ErrorCorrection, QrOptions, QrRenderer, RenderedImage};

#[cfg(feature = "render")]
pub use render::QrCodeRenderer;
