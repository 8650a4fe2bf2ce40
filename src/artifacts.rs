//! Download bridge.
//!
//! Turns the current vCard string into three downloadable artifacts and hands
//! out object URLs for them. Every refresh revokes all URLs issued before it,
//! so at most one generation of URLs is ever live.

use crate::error::{RenderError, Result};
use crate::render::{QrOptions, QrRenderer, PNG_FILE_NAME, PNG_MIME, SVG_FILE_NAME, SVG_MIME};
use contact_form::vcard::{VCARD_FILE_NAME, VCARD_MIME};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const URL_SCHEME: &str = "blob:vcard-qr/";

/// Opaque handle for a downloadable blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    fn generate() -> Self {
        Self(format!("{URL_SCHEME}{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bytes plus the metadata a download needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// In-memory stand-in for the browser's object URL table.
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    live: HashMap<ObjectUrl, Artifact>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, artifact: Artifact) -> ObjectUrl {
        let url = ObjectUrl::generate();
        tracing::debug!(url = %url, file = artifact.file_name, "object url created");
        self.live.insert(url.clone(), artifact);
        url
    }

    /// Returns whether the URL was live.
    pub fn revoke(&mut self, url: &ObjectUrl) -> bool {
        let revoked = self.live.remove(url).is_some();
        if revoked {
            tracing::debug!(url = %url, "object url revoked");
        }
        revoked
    }

    pub fn get(&self, url: &ObjectUrl) -> Option<&Artifact> {
        self.live.get(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// One download target as shown in the display panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub file_name: String,
    pub mime: String,
    pub url: ObjectUrl,
}

/// Links for the current artifacts, all from the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadLinks {
    pub vcard: DownloadLink,
    pub svg: DownloadLink,
    pub png: DownloadLink,
}

impl DownloadLinks {
    pub fn iter(&self) -> impl Iterator<Item = &DownloadLink> {
        [&self.vcard, &self.svg, &self.png].into_iter()
    }
}

pub struct DownloadBridge<R> {
    renderer: R,
    options: QrOptions,
    registry: ObjectUrlRegistry,
    links: Option<DownloadLinks>,
}

impl<R: QrRenderer> DownloadBridge<R> {
    pub fn new(renderer: R, options: QrOptions) -> Self {
        Self {
            renderer,
            options,
            registry: ObjectUrlRegistry::new(),
            links: None,
        }
    }

    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Re-derive all artifacts from `content`.
    ///
    /// Both images are rendered before anything is revoked, so a render
    /// failure leaves the current links live. Otherwise every previously
    /// issued URL is revoked before the new ones are created. Empty content
    /// only revokes.
    pub fn refresh(&mut self, content: &str) -> std::result::Result<Option<&DownloadLinks>, RenderError> {
        if content.is_empty() {
            self.clear();
            return Ok(None);
        }

        let svg = self.renderer.render_vector(content, &self.options)?;
        let png = self.renderer.render_bitmap(content, &self.options)?;
        self.clear();

        let vcard = self.register(VCARD_FILE_NAME, VCARD_MIME, content.as_bytes().to_vec());
        let svg = self.register(SVG_FILE_NAME, SVG_MIME, svg.bytes);
        let png = self.register(PNG_FILE_NAME, PNG_MIME, png.bytes);

        tracing::debug!(live = self.registry.live_count(), "download links refreshed");
        self.links = Some(DownloadLinks { vcard, svg, png });
        Ok(self.links.as_ref())
    }

    fn register(&mut self, file_name: &'static str, mime: &'static str, bytes: Vec<u8>) -> DownloadLink {
        let url = self.registry.create(Artifact {
            file_name,
            mime,
            bytes,
        });
        DownloadLink {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            url,
        }
    }

    /// Revoke every live URL.
    pub fn clear(&mut self) {
        if let Some(links) = self.links.take() {
            for link in links.iter() {
                self.registry.revoke(&link.url);
            }
        }
    }

    pub fn links(&self) -> Option<&DownloadLinks> {
        self.links.as_ref()
    }

    pub fn artifact(&self, url: &ObjectUrl) -> Option<&Artifact> {
        self.registry.get(url)
    }

    pub fn live_url_count(&self) -> usize {
        self.registry.live_count()
    }

    /// Write the live artifacts into `dir`, creating it if needed.
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let Some(links) = &self.links else {
            return Ok(Vec::new());
        };
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(3);
        for link in links.iter() {
            if let Some(artifact) = self.registry.get(&link.url) {
                let path = dir.join(artifact.file_name);
                std::fs::write(&path, &artifact.bytes)?;
                tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "artifact written");
                written.push(path);
            }
        }
        Ok(written)
    }
}

impl<R> fmt::Debug for DownloadBridge<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadBridge")
            .field("options", &self.options)
            .field("live_urls", &self.registry.live_count())
            .field("links", &self.links)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::render::RenderedImage;
    use proptest::prelude::*;
    use std::cell::Cell;

    /// Renderer that echoes the content, counting calls.
    #[derive(Default)]
    pub(crate) struct EchoRenderer {
        pub calls: Cell<usize>,
    }

    impl QrRenderer for EchoRenderer {
        fn render_vector(&self, content: &str, _: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            self.calls.set(self.calls.get() + 1);
            Ok(RenderedImage {
                bytes: format!("<svg>{content}</svg>").into_bytes(),
                mime: SVG_MIME,
                width: 1,
                height: 1,
            })
        }

        fn render_bitmap(&self, content: &str, _: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            self.calls.set(self.calls.get() + 1);
            Ok(RenderedImage {
                bytes: content.as_bytes().to_vec(),
                mime: PNG_MIME,
                width: 1,
                height: 1,
            })
        }
    }

    pub(crate) struct FailingRenderer;

    impl QrRenderer for FailingRenderer {
        fn render_vector(&self, _: &str, _: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            Err(RenderError::Encode("data too long".into()))
        }

        fn render_bitmap(&self, _: &str, _: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            Err(RenderError::Encode("data too long".into()))
        }
    }

    #[test]
    fn test_registry_create_and_revoke() {
        let mut registry = ObjectUrlRegistry::new();
        let url = registry.create(Artifact {
            file_name: VCARD_FILE_NAME,
            mime: VCARD_MIME,
            bytes: b"x".to_vec(),
        });
        assert!(url.as_str().starts_with("blob:vcard-qr/"));
        assert_eq!(registry.live_count(), 1);
        assert!(registry.revoke(&url));
        assert!(!registry.revoke(&url));
        assert!(registry.get(&url).is_none());
    }

    #[test]
    fn test_refresh_produces_three_links() {
        let mut bridge = DownloadBridge::new(EchoRenderer::default(), QrOptions::default());
        let links = bridge.refresh("BEGIN:VCARD").unwrap().unwrap().clone();

        assert_eq!(links.vcard.file_name, "vcard.vcf");
        assert_eq!(links.vcard.mime, "text/vcard;charset=UTF-8");
        assert_eq!(links.svg.file_name, "qrcode.svg");
        assert_eq!(links.png.mime, "image/png");
        assert_eq!(
            bridge.artifact(&links.vcard.url).unwrap().bytes,
            b"BEGIN:VCARD".to_vec()
        );
        assert_eq!(bridge.live_url_count(), 3);
    }

    #[test]
    fn test_refresh_revokes_previous_urls() {
        let mut bridge = DownloadBridge::new(EchoRenderer::default(), QrOptions::default());
        let first = bridge.refresh("one").unwrap().unwrap().clone();
        let second = bridge.refresh("two").unwrap().unwrap().clone();

        assert_eq!(bridge.live_url_count(), 3);
        for link in first.iter() {
            assert!(bridge.artifact(&link.url).is_none());
        }
        assert_ne!(first.vcard.url, second.vcard.url);
    }

    #[test]
    fn test_empty_content_only_revokes() {
        let mut bridge = DownloadBridge::new(EchoRenderer::default(), QrOptions::default());
        bridge.refresh("one").unwrap();
        let calls = bridge.renderer().calls.get();

        assert!(bridge.refresh("").unwrap().is_none());
        assert_eq!(bridge.live_url_count(), 0);
        assert_eq!(bridge.renderer().calls.get(), calls);
    }

    #[test]
    fn test_render_failure_registers_nothing() {
        let mut bridge = DownloadBridge::new(FailingRenderer, QrOptions::default());
        assert!(bridge.refresh("content").is_err());
        assert!(bridge.links().is_none());
        assert_eq!(bridge.live_url_count(), 0);
    }

    /// Renders until `budget` calls are used up, then fails.
    struct LimitedRenderer {
        budget: Cell<usize>,
    }

    impl QrRenderer for LimitedRenderer {
        fn render_vector(&self, content: &str, options: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            self.spend()?;
            EchoRenderer::default().render_vector(content, options)
        }

        fn render_bitmap(&self, content: &str, options: &QrOptions) -> std::result::Result<RenderedImage, RenderError> {
            self.spend()?;
            EchoRenderer::default().render_bitmap(content, options)
        }
    }

    impl LimitedRenderer {
        fn spend(&self) -> std::result::Result<(), RenderError> {
            match self.budget.get() {
                0 => Err(RenderError::Encode("data too long".into())),
                n => {
                    self.budget.set(n - 1);
                    Ok(())
                }
            }
        }
    }

    #[test]
    fn test_render_failure_keeps_previous_links() {
        let renderer = LimitedRenderer {
            budget: Cell::new(3),
        };
        let mut bridge = DownloadBridge::new(renderer, QrOptions::default());
        let first = bridge.refresh("first").unwrap().cloned().unwrap();

        // The vector render succeeds, the bitmap one fails.
        assert!(bridge.refresh("second").is_err());
        assert_eq!(bridge.links(), Some(&first));
        assert_eq!(bridge.live_url_count(), 3);
        assert_eq!(bridge.artifact(&first.vcard.url).unwrap().bytes, b"first");
    }

    proptest! {
        #[test]
        fn prop_only_latest_generation_is_live(
            contents in proptest::collection::vec("[a-z]{0,6}", 1..8),
        ) {
            let mut bridge = DownloadBridge::new(EchoRenderer::default(), QrOptions::default());
            let mut issued = Vec::new();
            for content in &contents {
                if let Some(links) = bridge.refresh(content).unwrap() {
                    issued.extend(links.iter().map(|link| link.url.clone()));
                }
            }

            let last = contents.last().map(String::as_str).unwrap_or_default();
            let expected = if last.is_empty() { 0 } else { 3 };
            prop_assert_eq!(bridge.live_url_count(), expected);

            let live: Vec<&ObjectUrl> = issued
                .iter()
                .filter(|url| bridge.artifact(url).is_some())
                .collect();
            prop_assert_eq!(live.len(), expected);
            if let Some(links) = bridge.links() {
                prop_assert!(links.iter().all(|link| live.contains(&&link.url)));
            }
        }
    }

    #[test]
    fn test_write_all_without_links_writes_nothing() {
        let bridge = DownloadBridge::new(EchoRenderer::default(), QrOptions::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(bridge.write_all(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_write_all_persists_artifacts() {
        let mut bridge = DownloadBridge::new(EchoRenderer::default(), QrOptions::default());
        bridge.refresh("card").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let written = bridge.write_all(&out).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read_to_string(out.join("vcard.vcf")).unwrap(), "card");
        assert_eq!(
            std::fs::read_to_string(out.join("qrcode.svg")).unwrap(),
            "<svg>card</svg>"
        );
    }
}
