//! Region lifecycle: open, enumerate, delete.
//!
//! A region is created on first open and only ever destroyed as a whole.

use super::connection::CacheStore;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// Summary of a stored region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RegionInfo {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl CacheStore {
    /// Open a region, creating it if it does not exist yet.
    pub async fn open_region(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO regions (name, created_at) VALUES (?1, ?2)",
                    params![name, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a region exists.
    pub async fn has_region(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row("SELECT EXISTS(SELECT 1 FROM regions WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })
                    .map_err(Error::from)?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all regions, in creation order.
    pub async fn region_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM regions ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// All regions with their entry counts.
    pub async fn list_regions(&self) -> Result<Vec<RegionInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<RegionInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT r.name, r.created_at, COUNT(e.key_hash)
                     FROM regions r LEFT JOIN entries e ON e.region = r.name
                     GROUP BY r.name
                     ORDER BY r.created_at ASC, r.name ASC",
                )?;
                let regions = stmt
                    .query_map([], |row| {
                        Ok(RegionInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(regions)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a region and every entry in it.
    ///
    /// Returns false if the region did not exist.
    pub async fn delete_region(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM regions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::super::connection::CacheStore;
    use super::super::snapshots::Snapshot;

    #[tokio::test]
    async fn test_open_region_idempotent() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_region("roam-ang-cache-v1").await.unwrap();
        store.open_region("roam-ang-cache-v1").await.unwrap();

        assert!(store.has_region("roam-ang-cache-v1").await.unwrap());
        assert_eq!(store.region_names().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_region_cascades_entries() {
        let store = CacheStore::open_in_memory().await.unwrap();
        let snapshot = Snapshot::new("https://roamaxa.app/", "GET", 200, vec![], b"<html>".to_vec());
        store.put_snapshot("roam-ang-cache-v0", &snapshot).await.unwrap();

        assert!(store.delete_region("roam-ang-cache-v0").await.unwrap());
        assert!(!store.has_region("roam-ang-cache-v0").await.unwrap());

        store.open_region("roam-ang-cache-v0").await.unwrap();
        let hit = store.match_snapshot("roam-ang-cache-v0", "GET", "https://roamaxa.app/").await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_region() {
        let store = CacheStore::open_in_memory().await.unwrap();
        assert!(!store.delete_region("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_regions_counts() {
        let store = CacheStore::open_in_memory().await.unwrap();
        store.open_region("empty").await.unwrap();
        for path in ["places", "events"] {
            let url = format!("https://roamaxa.app/jsonassets/{path}.json");
            store
                .put_snapshot("data", &Snapshot::new(&url, "GET", 200, vec![], b"[]".to_vec()))
                .await
                .unwrap();
        }

        let regions = store.list_regions().await.unwrap();
        let counts: Vec<(String, u64)> = regions.into_iter().map(|r| (r.name, r.entries)).collect();
        assert!(counts.contains(&("empty".to_string(), 0)));
        assert!(counts.contains(&("data".to_string(), 2)));
    }
}
