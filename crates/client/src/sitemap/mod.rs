//! Dynamic sitemap synthesis.
//!
//! ### Document
//! - One `<url>` per configured section, always stamped today.
//! - One `<url>` per listing item with a target path: `monthly`, priority `0.8`.
//! - Item dates follow [`SitemapDatePolicy`]: the worker has always stamped
//!   today; `use-item-date` matches the offline generator instead.
//!
//! ### Failure policy
//! - Listing fetch failure, non-ok status or malformed JSON -> empty listing.
//! - Anything else that prevents rendering -> `500` with an XML comment body.
//! - Responses are never stored and carry `Cache-Control: no-store`.

pub mod listing;
pub mod xml;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use roam_core::{Error, SectionEntry, SitemapDatePolicy, WorkerConfig};
use url::Url;

pub use listing::{ContentItem, parse_item_date, parse_listing};
pub use xml::{UrlEntry, escape, render_urlset, unescape};

use crate::fetch::{Network, resolve};
use crate::request::{CacheMode, Request, Response};

const ITEM_CHANGEFREQ: &str = "monthly";
const ITEM_PRIORITY: &str = "0.8";
const FAILURE_BODY: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- sitemap generation failed -->\n";

#[derive(Debug, Clone)]
pub struct SitemapSynthesizer {
    base: String,
    listing_url: Url,
    sections: Vec<SectionEntry>,
    policy: SitemapDatePolicy,
}

impl SitemapSynthesizer {
    pub fn new(config: &WorkerConfig, origin: &Url) -> Result<Self, Error> {
        let listing_url =
            resolve(origin, &config.content_listing_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base: origin.as_str().trim_end_matches('/').to_string(),
            listing_url,
            sections: config.sitemap_sections.clone(),
            policy: config.sitemap_date_policy,
        })
    }

    pub fn with_policy(mut self, policy: SitemapDatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn listing_url(&self) -> &Url {
        &self.listing_url
    }

    /// Fetch the content listing, degrading every failure to an empty listing.
    pub async fn fetch_listing(&self, network: &dyn Network) -> Vec<ContentItem> {
        let request = Request::get(self.listing_url.clone()).with_cache(CacheMode::NoStore);
        match network.fetch(&request).await {
            Ok(response) if response.is_ok() => parse_listing(&response.body),
            Ok(response) => {
                tracing::warn!("content listing answered {}, using static sections only", response.status);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("content listing unavailable ({}), using static sections only", e);
                Vec::new()
            }
        }
    }

    /// Sitemap entries for the given listing.
    pub fn entries(&self, items: &[ContentItem], today: NaiveDate) -> Result<Vec<UrlEntry>, Error> {
        let mut entries = Vec::with_capacity(self.sections.len() + items.len());

        for section in &self.sections {
            check_priority(&section.priority)?;
            entries.push(UrlEntry {
                loc: format!("{}{}", self.base, section.path),
                lastmod: today,
                changefreq: section.changefreq.clone(),
                priority: section.priority.clone(),
            });
        }

        for item in items {
            let Some(target) = item.target() else { continue };
            let lastmod = match self.policy {
                SitemapDatePolicy::AlwaysToday => today,
                SitemapDatePolicy::UseItemDate => item.published().unwrap_or(today),
            };
            entries.push(UrlEntry {
                loc: format!("{}{}", self.base, target),
                lastmod,
                changefreq: ITEM_CHANGEFREQ.to_string(),
                priority: ITEM_PRIORITY.to_string(),
            });
        }

        Ok(entries)
    }

    /// Render the full document for the given listing.
    pub fn render(&self, items: &[ContentItem], today: NaiveDate) -> Result<String, Error> {
        let entries = self.entries(items, today)?;
        render_urlset(&entries).map_err(|e| Error::SitemapFailed(e.to_string()))
    }

    /// Build the response for one sitemap request.
    pub async fn respond(&self, network: &dyn Network, today: NaiveDate) -> Response {
        let items = self.fetch_listing(network).await;
        match self.render(&items, today) {
            Ok(document) => {
                tracing::debug!("synthesized sitemap with {} listing items", items.len());
                Response::new(StatusCode::OK, xml_headers(), document)
            }
            Err(e) => {
                tracing::error!("sitemap synthesis failed: {}", e);
                Response::new(StatusCode::INTERNAL_SERVER_ERROR, xml_headers(), FAILURE_BODY)
            }
        }
    }
}

fn check_priority(priority: &str) -> Result<(), Error> {
    match priority.parse::<f32>() {
        Ok(p) if (0.0..=1.0).contains(&p) => Ok(()),
        _ => Err(Error::SitemapFailed(format!("invalid section priority {priority:?}"))),
    }
}

fn xml_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}
