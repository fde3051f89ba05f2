//! Request classification.
//!
//! Rules, first match wins:
//! 1. path is the synthetic sitemap path -> `dynamic-sitemap`
//! 2. navigation to `/`, or the manifest path -> `shell`
//! 3. `.json` under the data prefix -> `json-data`
//! 4. anything else -> `unhandled`
//!
//! Non-GET requests are never classified; stored identities are GET-only.

use std::fmt;

use reqwest::Method;
use roam_core::WorkerConfig;

use crate::request::Request;

/// Routing category of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceClass {
    Shell,
    JsonData,
    DynamicSitemap,
    Unhandled,
}

impl ResourceClass {
    /// Handling strategy for this class; `None` means the event is not claimed.
    pub fn strategy(self) -> Option<Strategy> {
        match self {
            Self::Shell => Some(Strategy::StaleWhileRevalidate),
            Self::JsonData => Some(Strategy::NetworkFirst),
            Self::DynamicSitemap => Some(Strategy::SynthesizeSitemap),
            Self::Unhandled => None,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Shell => "shell",
            Self::JsonData => "json-data",
            Self::DynamicSitemap => "dynamic-sitemap",
            Self::Unhandled => "unhandled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StaleWhileRevalidate,
    NetworkFirst,
    SynthesizeSitemap,
}

/// Path patterns the classifier routes on.
#[derive(Debug, Clone)]
pub struct Classifier {
    sitemap_path: String,
    manifest_path: String,
    data_prefix: String,
}

impl Classifier {
    pub fn new(
        sitemap_path: impl Into<String>, manifest_path: impl Into<String>, data_prefix: impl Into<String>,
    ) -> Self {
        Self { sitemap_path: sitemap_path.into(), manifest_path: manifest_path.into(), data_prefix: data_prefix.into() }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(&config.sitemap_path, &config.manifest_path, &config.data_prefix)
    }

    pub fn classify(&self, request: &Request) -> ResourceClass {
        if request.method != Method::GET {
            return ResourceClass::Unhandled;
        }

        let path = request.path();
        if path == self.sitemap_path {
            ResourceClass::DynamicSitemap
        } else if (request.is_navigation() && path == "/") || path == self.manifest_path {
            ResourceClass::Shell
        } else if path.starts_with(&self.data_prefix) && path.ends_with(".json") {
            ResourceClass::JsonData
        } else {
            ResourceClass::Unhandled
        }
    }

    pub fn strategy_for(&self, request: &Request) -> Option<Strategy> {
        self.classify(request).strategy()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&WorkerConfig::default())
    }
}
