//! Creator configuration.
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! | Variable                 | Field                   |
//! |--------------------------|-------------------------|
//! | `VCARD_QR_SIZE`          | `qr.size`               |
//! | `VCARD_QR_ECC`           | `qr.error_correction`   |
//! | `VCARD_QR_OUTPUT_DIR`    | `output_dir`            |
//! | `VCARD_QR_CONFIRM_RESET` | `confirm_reset`         |

use crate::error::ConfigError;
use crate::render::{parse_hex_color, ErrorCorrection, QrOptions};
use contact_form::{ValidationMode, DEFAULT_TRANSIENT_ERROR_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_QR_SIZE: &str = "VCARD_QR_SIZE";
pub const ENV_QR_ECC: &str = "VCARD_QR_ECC";
pub const ENV_OUTPUT_DIR: &str = "VCARD_QR_OUTPUT_DIR";
pub const ENV_CONFIRM_RESET: &str = "VCARD_QR_CONFIRM_RESET";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub qr: QrOptions,
    /// How long a phone input error stays visible.
    pub transient_error_ms: u64,
    pub validation_mode: ValidationMode,
    /// Ask before clearing a form that already produced a QR code.
    pub confirm_reset: bool,
    /// Where the CLI writes artifacts.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            qr: QrOptions::default(),
            transient_error_ms: DEFAULT_TRANSIENT_ERROR_MS,
            validation_mode: ValidationMode::OnChange,
            confirm_reset: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// File (or defaults), then `.env`, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("loaded .env");
        }
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; lets tests avoid the process env.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_QR_SIZE) {
            self.qr.size = value.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    key: ENV_QR_SIZE.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(value) = lookup(ENV_QR_ECC) {
            self.qr.error_correction =
                value
                    .parse::<ErrorCorrection>()
                    .map_err(|reason| ConfigError::InvalidEnv {
                        key: ENV_QR_ECC.to_string(),
                        value: value.clone(),
                        reason,
                    })?;
        }
        if let Some(value) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_CONFIRM_RESET) {
            self.confirm_reset = parse_flag(&value).ok_or_else(|| ConfigError::InvalidEnv {
                key: ENV_CONFIRM_RESET.to_string(),
                value: value.clone(),
                reason: "expected true/false".to_string(),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qr.size == 0 {
            return Err(ConfigError::Invalid("qr.size must be positive".to_string()));
        }
        for color in [&self.qr.dark_color, &self.qr.light_color] {
            parse_hex_color(color).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
