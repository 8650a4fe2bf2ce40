//! QR code rendering.
//!
//! The creator only depends on the [`QrRenderer`] trait. [`QrCodeRenderer`]
//! (feature `render`) is the shipped implementation: SVG via the `qrcode`
//! crate's string renderer, PNG via an RGBA buffer encoded with `image`.

use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SVG_MIME: &str = "image/svg+xml";
pub const PNG_MIME: &str = "image/png";
pub const SVG_FILE_NAME: &str = "qrcode.svg";
pub const PNG_FILE_NAME: &str = "qrcode.png";

/// Default edge length in pixels.
pub const DEFAULT_QR_SIZE: u32 = 128;

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// ~7% recovery
    #[default]
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(Self::L),
            "M" | "MEDIUM" => Ok(Self::M),
            "Q" | "QUARTILE" => Ok(Self::Q),
            "H" | "HIGH" => Ok(Self::H),
            other => Err(format!("unknown error correction level '{other}'")),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        };
        f.write_str(level)
    }
}

/// Rendering options shared by both image variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrOptions {
    /// Minimum edge length in pixels; the code is scaled up to whole modules.
    pub size: u32,
    pub error_correction: ErrorCorrection,
    pub dark_color: String,
    pub light_color: String,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_QR_SIZE,
            error_correction: ErrorCorrection::L,
            dark_color: "#000000".to_string(),
            light_color: "#ffffff".to_string(),
        }
    }
}

/// Encoded image ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Black-box QR renderer.
pub trait QrRenderer {
    /// SVG document for `content`.
    fn render_vector(&self, content: &str, options: &QrOptions)
        -> Result<RenderedImage, RenderError>;

    /// PNG image for `content`.
    fn render_bitmap(&self, content: &str, options: &QrOptions)
        -> Result<RenderedImage, RenderError>;
}

/// Parse `#rrggbb` into RGB bytes.
pub fn parse_hex_color(color: &str) -> Result<[u8; 3], RenderError> {
    let invalid = || RenderError::InvalidColor(color.to_string());
    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[cfg(feature = "render")]
pub use shipped::QrCodeRenderer;

#[cfg(feature = "render")]
mod shipped {
    use super::*;
    use image::{ImageFormat, Rgba};
    use qrcode::render::svg;
    use qrcode::{EcLevel, QrCode};
    use std::io::Cursor;

    /// Renderer backed by the `qrcode` crate. No quiet zone is drawn.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct QrCodeRenderer;

    impl QrCodeRenderer {
        pub fn new() -> Self {
            Self
        }

        fn encode(content: &str, options: &QrOptions) -> Result<QrCode, RenderError> {
            if content.is_empty() {
                return Err(RenderError::EmptyContent);
            }
            let level = match options.error_correction {
                ErrorCorrection::L => EcLevel::L,
                ErrorCorrection::M => EcLevel::M,
                ErrorCorrection::Q => EcLevel::Q,
                ErrorCorrection::H => EcLevel::H,
            };
            QrCode::with_error_correction_level(content.as_bytes(), level)
                .map_err(|e| RenderError::Encode(e.to_string()))
        }

        /// Edge length the renderer produces for a code of `modules` width.
        fn edge_length(modules: u32, size: u32) -> u32 {
            let modules = modules.max(1);
            let unit = size.div_ceil(modules).max(1);
            modules * unit
        }
    }

    impl QrRenderer for QrCodeRenderer {
        fn render_vector(
            &self,
            content: &str,
            options: &QrOptions,
        ) -> Result<RenderedImage, RenderError> {
            parse_hex_color(&options.dark_color)?;
            parse_hex_color(&options.light_color)?;
            let code = Self::encode(content, options)?;

            let document = code
                .render::<svg::Color<'_>>()
                .min_dimensions(options.size, options.size)
                .quiet_zone(false)
                .dark_color(svg::Color(options.dark_color.as_str()))
                .light_color(svg::Color(options.light_color.as_str()))
                .build();

            let edge = Self::edge_length(code.width() as u32, options.size);
            tracing::debug!(edge, bytes = document.len(), "rendered qr svg");
            Ok(RenderedImage {
                bytes: document.into_bytes(),
                mime: SVG_MIME,
                width: edge,
                height: edge,
            })
        }

        fn render_bitmap(
            &self,
            content: &str,
            options: &QrOptions,
        ) -> Result<RenderedImage, RenderError> {
            let [dr, dg, db] = parse_hex_color(&options.dark_color)?;
            let [lr, lg, lb] = parse_hex_color(&options.light_color)?;
            let code = Self::encode(content, options)?;

            let buffer = code
                .render::<Rgba<u8>>()
                .min_dimensions(options.size, options.size)
                .quiet_zone(false)
                .dark_color(Rgba([dr, dg, db, 255]))
                .light_color(Rgba([lr, lg, lb, 255]))
                .build();

            let (width, height) = buffer.dimensions();
            let mut bytes = Vec::new();
            buffer
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
                .map_err(|e| RenderError::Image(e.to_string()))?;
            tracing::debug!(width, height, bytes = bytes.len(), "rendered qr png");

            Ok(RenderedImage {
                bytes,
                mime: PNG_MIME,
                width,
                height,
            })
        }
    }
}
