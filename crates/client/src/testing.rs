//! Scriptable in-process network for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use roam_core::{CacheStore, Error};
use tempfile::TempDir;
use tokio_rusqlite::rusqlite;

use crate::fetch::Network;
use crate::request::{Request, Response};

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(Response),
    Fail,
    /// Never resolves.
    Hang,
}

pub fn respond(status: u16, content_type: &'static str, body: &str) -> Reply {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    Reply::Respond(Response::new(StatusCode::from_u16(status).unwrap(), headers, body.to_string()))
}

/// Routes by full URL; anything unrouted behaves as offline.
#[derive(Default)]
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<Request>>,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, reply: Reply) -> Self {
        self.set(url, reply);
        self
    }

    pub fn set(&self, url: &str, reply: Reply) {
        self.routes.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| r.url.as_str() == url).count()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.clone());
        let reply = self.routes.lock().unwrap().get(request.url.as_str()).cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Fail) | None => Err(Error::Network(format!("offline: {}", request.url))),
        }
    }
}

/// A file-backed store with a second connection that can break it underneath.
pub struct FaultyStore {
    pub store: CacheStore,
    side: rusqlite::Connection,
    _dir: TempDir,
}

impl FaultyStore {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        let store = CacheStore::open(&path).await.unwrap();
        let side = rusqlite::Connection::open(&path).unwrap();
        Self { store, side, _dir: dir }
    }

    /// Every later read or write of an entry fails.
    pub fn drop_entries(&self) {
        self.side.execute_batch("DROP TABLE entries").unwrap();
    }

    /// Stored headers no longer decode.
    pub fn corrupt_headers(&self) {
        self.side.execute_batch("UPDATE entries SET headers_json = 'not json'").unwrap();
    }
}
