//! The two creator pages. Both run the same `Creator`; only the mode differs.

use super::{Creator, ScrollTarget};
use crate::config::AppConfig;
use crate::render::QrRenderer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatorMode {
    /// Static vCard encoded directly in the QR code.
    #[default]
    QrCode,
    ContactPage,
}

impl CreatorMode {
    pub fn heading(&self) -> &'static str {
        match self {
            Self::QrCode => "Create a vCard QR code",
            Self::ContactPage => "Create a contact page",
        }
    }

    /// Namespace for element ids, so both pages can live in one document.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::QrCode => "static",
            Self::ContactPage => "dynamic",
        }
    }

    pub fn element_id(&self, target: &ScrollTarget) -> Option<String> {
        target
            .element_id()
            .map(|id| format!("{}-{}", self.prefix(), id))
    }
}

impl fmt::Display for CreatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

macro_rules! mode_wrapper {
    ($name:ident, $mode:expr) => {
        #[derive(Debug)]
        pub struct $name<R>(Creator<R>);

        impl<R: QrRenderer> $name<R> {
            pub fn new(renderer: R, config: AppConfig) -> Self {
                Self(Creator::new($mode, renderer, config))
            }

            pub fn into_inner(self) -> Creator<R> {
                self.0
            }
        }

        impl<R> Deref for $name<R> {
            type Target = Creator<R>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl<R> DerefMut for $name<R> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

mode_wrapper!(QrCodeCreator, CreatorMode::QrCode);
mode_wrapper!(ContactPageCreator, CreatorMode::ContactPage);
