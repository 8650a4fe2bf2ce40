//! Error types for the creator layer.
//!
//! Validation failures are not errors: a rejected submit is reported as
//! `SubmitOutcome::Rejected` carrying the field errors. A creator reports
//! render failures the same way (`SubmitOutcome::RenderFailed`).

use contact_form::FormError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the creator.
#[derive(Error, Debug)]
pub enum VcardQrError {
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// QR rendering failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Nothing to encode: content is empty")]
    EmptyContent,

    #[error("QR encoding failed: {0}")]
    Encode(String),

    #[error("Invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    #[error("Image encoding failed: {0}")]
    Image(String),
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl VcardQrError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Form(e) => e.code(),
            Self::Render(_) => "RENDER_FAILED",
            Self::Config(_) => "CONFIG_INVALID",
            Self::Io(_) => "IO_FAILED",
            Self::Serialization(_) | Self::Yaml(_) => "SERIALIZATION_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, VcardQrError>;
