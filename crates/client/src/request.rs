//! Intercepted request and response model.
//!
//! A [`Request`] carries what the worker needs to route it: URL, method,
//! navigation mode and cache mode. A [`Response`] is what the worker hands
//! back, whether it came from the network, a stored snapshot or was
//! synthesized.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use roam_core::{Error, Snapshot};
use serde::{Deserialize, Serialize};
use url::Url;

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document navigation.
    Navigate,
    SameOrigin,
    #[default]
    NoCors,
    Cors,
}

impl FromStr for RequestMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigate" => Ok(Self::Navigate),
            "same-origin" => Ok(Self::SameOrigin),
            "no-cors" => Ok(Self::NoCors),
            "cors" => Ok(Self::Cors),
            other => Err(Error::InvalidInput(format!("unknown request mode: {other}"))),
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Navigate => "navigate",
            Self::SameOrigin => "same-origin",
            Self::NoCors => "no-cors",
            Self::Cors => "cors",
        };
        f.write_str(s)
    }
}

/// HTTP cache interaction requested for the outgoing fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass every HTTP cache layer and do not populate it.
    NoStore,
    /// Bypass HTTP caches on the way out, refresh them on the way back.
    Reload,
}

impl CacheMode {
    /// Whether intermediate HTTP caches must be bypassed.
    pub fn bypasses_http_cache(self) -> bool {
        matches!(self, Self::NoStore | Self::Reload)
    }
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub mode: RequestMode,
    pub cache: CacheMode,
}

impl Request {
    /// A plain subresource GET.
    pub fn get(url: Url) -> Self {
        Self { url, method: Method::GET, mode: RequestMode::default(), cache: CacheMode::default() }
    }

    /// A top-level document navigation.
    pub fn navigate(url: Url) -> Self {
        Self { mode: RequestMode::Navigate, ..Self::get(url) }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response delivered to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// Synthetic `200 []` served when a JSON feed has neither network nor cache.
    pub fn empty_json_array() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self::new(StatusCode::OK, headers, Bytes::from_static(b"[]"))
    }

    /// Whether the status is in the 2xx range.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Capture this response as the stored answer to `request`.
    pub fn to_snapshot(&self, request: &Request) -> Snapshot {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();
        Snapshot::new(request.url.as_str(), request.method.as_str(), self.status.as_u16(), headers, self.body.to_vec())
    }

    /// Rebuild a response from a stored snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, Error> {
        let status = StatusCode::from_u16(snapshot.status)
            .map_err(|e| Error::CorruptSnapshot(format!("{}: {e}", snapshot.url)))?;

        let mut headers = HeaderMap::with_capacity(snapshot.headers.len());
        for (name, value) in &snapshot.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::CorruptSnapshot(format!("{}: {e}", snapshot.url)))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| Error::CorruptSnapshot(format!("{}: {e}", snapshot.url)))?;
            headers.append(name, value);
        }

        Ok(Self::new(status, headers, snapshot.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_request_builders() {
        let req = Request::navigate(url("https://roamaxa.app/")).with_cache(CacheMode::Reload);
        assert!(req.is_navigation());
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path(), "/");
        assert!(req.cache.bypasses_http_cache());
        assert!(!CacheMode::Default.bypasses_http_cache());
    }

    #[test]
    fn test_request_mode_parse() {
        assert_eq!("navigate".parse::<RequestMode>().unwrap(), RequestMode::Navigate);
        assert_eq!("same-origin".parse::<RequestMode>().unwrap(), RequestMode::SameOrigin);
        assert_eq!(RequestMode::NoCors.to_string(), "no-cors");
        assert!(matches!("websocket".parse::<RequestMode>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_json_array() {
        let resp = Response::empty_json_array();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.text(), "[]");
        assert_eq!(resp.content_type(), Some("application/json"));
    }

    #[test]
    fn test_snapshot_preserves_response() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        let resp = Response::new(StatusCode::OK, headers, "<html></html>");
        let req = Request::navigate(url("https://roamaxa.app/"));

        let snapshot = resp.to_snapshot(&req);
        assert_eq!(snapshot.url, "https://roamaxa.app/");
        assert_eq!(snapshot.method, "GET");
        assert_eq!(snapshot.status, 200);

        assert_eq!(Response::from_snapshot(&snapshot).unwrap(), resp);
    }

    #[test]
    fn test_corrupt_snapshot() {
        let snapshot = Snapshot::new("https://roamaxa.app/", "GET", 42, vec![], vec![]);
        assert!(matches!(Response::from_snapshot(&snapshot), Err(Error::CorruptSnapshot(_))));
    }
}
