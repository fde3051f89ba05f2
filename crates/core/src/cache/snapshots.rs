//! Response snapshot storage.
//!
//! Provides put/match operations for stored responses within a region.
//! A put always overwrites the previous entry for the same request identity.

use super::connection::CacheStore;
use super::hash::request_key;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// An immutable capture of a response at the moment it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Snapshot {
    pub url: String,
    pub method: String,
    pub status: u16,
    /// Header name/value pairs in the order they were received.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl Snapshot {
    /// Capture a response stamped with the current time.
    pub fn new(url: &str, method: &str, status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_ascii_uppercase(),
            status,
            headers,
            body,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Identity key of the request this snapshot answers.
    pub fn key(&self) -> String {
        request_key(&self.method, &self.url)
    }
}

impl CacheStore {
    /// Store a snapshot into a region, creating the region on first use.
    ///
    /// Uses UPSERT semantics: a later put for the same request wins.
    pub async fn put_snapshot(&self, region: &str, snapshot: &Snapshot) -> Result<(), Error> {
        let region = region.to_string();
        let snapshot = snapshot.clone();
        let headers_json =
            serde_json::to_string(&snapshot.headers).map_err(|e| Error::CorruptSnapshot(e.to_string()))?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO regions (name, created_at) VALUES (?1, ?2)",
                    params![&region, &snapshot.stored_at],
                )?;
                tx.execute(
                    "INSERT INTO entries (region, key_hash, url, method, status, headers_json, body, stored_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(region, key_hash) DO UPDATE SET
                        url = excluded.url,
                        method = excluded.method,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        &region,
                        snapshot.key(),
                        &snapshot.url,
                        &snapshot.method,
                        snapshot.status,
                        headers_json,
                        &snapshot.body,
                        &snapshot.stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the snapshot stored for a request in a region.
    ///
    /// Returns None if the region or the entry doesn't exist.
    pub async fn match_snapshot(&self, region: &str, method: &str, url: &str) -> Result<Option<Snapshot>, Error> {
        let region = region.to_string();
        let key = request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<Snapshot>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, method, status, headers_json, body, stored_at
                    FROM entries WHERE region = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![region, key], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u16>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                });

                match result {
                    Ok((url, method, status, headers_json, body, stored_at)) => {
                        let headers = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::CorruptSnapshot(format!("{url}: {e}")))?;
                        Ok(Some(Snapshot { url, method, status, headers, body, stored_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
