//! SQLite-based cache storage with file blob support
//!
//! Stores small bodies inline in SQLite, large bodies (>10KB) as files.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::key::blob_name;
use super::{CacheStore, Result};
use crate::client::{Request, Response, ResponseKind};
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

/// Bodies larger than this are stored as external blobs
const INLINE_THRESHOLD: usize = 10 * 1024; // 10KB

/// SQLite-backed cache storage with file blob support
pub struct CacheStorage {
    conn: Mutex<Connection>,
    blobs_dir: PathBuf,
}

impl CacheStorage {
    /// Open or create cache storage at the default platform cache location
    pub fn open_default() -> Result<Self> {
        let cache_dir = Self::cache_dir()?;
        Self::open_at(&cache_dir)
    }

    /// Get the cache directory path (~/.cache/homedash on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(cache_base.join("homedash"))
    }

    /// Open cache storage at a specific directory
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join("cache.db");
        let blobs_dir = cache_dir.join("blobs");
        std::fs::create_dir_all(&blobs_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create blobs dir: {}", e)))?;

        let conn = Connection::open(&db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            Self::nuke(&db_path, &blobs_dir)?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS caches (
                name TEXT PRIMARY KEY NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cache_entries (
                cache_name TEXT NOT NULL,
                request_key TEXT NOT NULL,
                url TEXT NOT NULL,
                status INTEGER NOT NULL,
                kind TEXT NOT NULL,
                content_type TEXT,
                data BLOB,
                blob_path TEXT,
                stored_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL,
                PRIMARY KEY (cache_name, request_key)
            );

            CREATE INDEX IF NOT EXISTS idx_request_key ON cache_entries(request_key);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
            blobs_dir,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Entries of one store, most recent first
    pub fn entries(&self, cache_name: &str) -> Result<Vec<EntryInfo>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT url, status, kind, size_bytes, stored_at FROM cache_entries
             WHERE cache_name = ?1
             ORDER BY stored_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map([cache_name], |row| {
            Ok(EntryInfo {
                url: row.get(0)?,
                status: row.get(1)?,
                kind: row.get(2)?,
                size_bytes: row.get::<_, i64>(3)? as usize,
                stored_at: row.get(4)?,
            })
        })?;

        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Clear all stores and entries
    pub fn clear_all(&self) -> Result<ClearStats> {
        let conn = self.conn();
        let entries: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;
        let stores: i64 = conn.query_row("SELECT COUNT(*) FROM caches", [], |r| r.get(0))?;

        conn.execute("DELETE FROM cache_entries", [])?;
        conn.execute("DELETE FROM caches", [])?;

        if self.blobs_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.blobs_dir) {
                log::warn!("Failed to clear blobs directory: {}", e);
            }
            std::fs::create_dir_all(&self.blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to recreate blobs dir: {}", e)))?;
        }

        Ok(ClearStats {
            stores_removed: stores as usize,
            entries_removed: entries as usize,
        })
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            "SELECT c.name, COUNT(e.request_key), COALESCE(SUM(e.size_bytes), 0)
             FROM caches c LEFT JOIN cache_entries e ON e.cache_name = c.name
             GROUP BY c.name ORDER BY c.name",
        )?;
        let stores = stmt
            .query_map([], |row| {
                Ok(StoreSummary {
                    name: row.get(0)?,
                    entries: row.get::<_, i64>(1)? as usize,
                    size_bytes: row.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let oldest: Option<i64> = conn
            .query_row("SELECT MIN(stored_at) FROM cache_entries", [], |r| r.get(0))
            .optional()?
            .flatten();

        let newest: Option<i64> = conn
            .query_row("SELECT MAX(stored_at) FROM cache_entries", [], |r| r.get(0))
            .optional()?
            .flatten();

        Ok(CacheStats {
            total_entries: stores.iter().map(|s| s.entries).sum(),
            total_size_bytes: stores.iter().map(|s| s.size_bytes).sum(),
            stores,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }

    fn ensure_store(conn: &Connection, cache_name: &str) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
            params![cache_name, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    /// Write a blob file, sharded by first 2 chars of its name
    fn write_blob(&self, name: &str, data: &[u8]) -> Result<String> {
        let shard = &name[..2.min(name.len())];
        let shard_dir = self.blobs_dir.join(shard);
        std::fs::create_dir_all(&shard_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create shard dir: {}", e)))?;

        let filename = format!("{}.bin", name);
        let rel_path = format!("{}/{}", shard, filename);
        let full_path = shard_dir.join(&filename);

        std::fs::write(&full_path, data)
            .map_err(|e| CacheError::Io(format!("Failed to write blob: {}", e)))?;

        Ok(rel_path)
    }

    fn remove_blob(&self, rel_path: &str) {
        if let Err(e) = std::fs::remove_file(self.blobs_dir.join(rel_path)) {
            log::warn!("Failed to remove blob {}: {}", rel_path, e);
        }
    }

    /// Nuke the cache (delete DB and all blobs)
    fn nuke(db_path: &Path, blobs_dir: &Path) -> Result<()> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
        }
        if blobs_dir.exists() {
            std::fs::remove_dir_all(blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to remove blobs dir: {}", e)))?;
        }
        Ok(())
    }
}

impl CacheStore for CacheStorage {
    fn open(&self, cache_name: &str) -> Result<()> {
        Self::ensure_store(&self.conn(), cache_name)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY created_at, name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn delete(&self, cache_name: &str) -> Result<bool> {
        let blob_paths: Vec<String> = {
            let conn = self.conn();
            let mut stmt = conn.prepare(
                "SELECT blob_path FROM cache_entries
                 WHERE cache_name = ?1 AND blob_path IS NOT NULL",
            )?;
            let paths = stmt
                .query_map([cache_name], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;

            conn.execute("DELETE FROM cache_entries WHERE cache_name = ?1", [cache_name])?;
            let deleted = conn.execute("DELETE FROM caches WHERE name = ?1", [cache_name])?;
            if deleted == 0 {
                return Ok(false);
            }
            paths
        };

        for path in blob_paths {
            self.remove_blob(&path);
        }
        Ok(true)
    }

    fn put(&self, cache_name: &str, request: &Request, response: &Response) -> Result<()> {
        let key = request.key();
        let now = Utc::now().timestamp_millis();
        let data = &response.body;

        let conn = self.conn();
        Self::ensure_store(&conn, cache_name)?;

        let previous_blob: Option<String> = conn
            .query_row(
                "SELECT blob_path FROM cache_entries WHERE cache_name = ?1 AND request_key = ?2",
                params![cache_name, key],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        let (inline, blob_path) = if data.len() <= INLINE_THRESHOLD {
            (Some(data.as_slice()), None)
        } else {
            (None, Some(self.write_blob(&blob_name(cache_name, &key), data)?))
        };

        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
             (cache_name, request_key, url, status, kind, content_type, data, blob_path, stored_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                cache_name,
                key,
                request.url.as_str(),
                response.status,
                response.kind.as_str(),
                response.content_type,
                inline,
                blob_path,
                now,
                data.len()
            ],
        )?;

        if let Some(old) = previous_blob
            && blob_path.as_deref() != Some(old.as_str())
        {
            self.remove_blob(&old);
        }

        Ok(())
    }

    fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        let key = request.key();
        let conn = self.conn();

        type Row = (String, u16, String, Option<String>, Option<Vec<u8>>, Option<String>);
        let row: Option<Row> = conn
            .query_row(
                "SELECT cache_name, status, kind, content_type, data, blob_path FROM cache_entries
                 WHERE request_key = ?1
                 ORDER BY stored_at DESC, rowid DESC LIMIT 1",
                [&key],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
            )
            .optional()?;

        let Some((cache_name, status, kind, content_type, data, blob_path)) = row else {
            return Ok(None);
        };

        let body = match (data, blob_path) {
            (Some(data), None) => data,
            (None, Some(blob_path)) => match std::fs::read(self.blobs_dir.join(&blob_path)) {
                Ok(data) => data,
                Err(e) => {
                    log::warn!("Failed to read blob {}: {}", blob_path, e);
                    // Delete stale entry
                    if let Err(e) = conn.execute(
                        "DELETE FROM cache_entries WHERE cache_name = ?1 AND request_key = ?2",
                        params![cache_name, key],
                    ) {
                        log::warn!("Failed to delete stale entry {}: {}", key, e);
                    }
                    return Ok(None);
                }
            },
            _ => return Ok(None),
        };

        Ok(Some(Response {
            status,
            kind: ResponseKind::parse(&kind).unwrap_or(ResponseKind::Basic),
            content_type,
            body,
        }))
    }
}

/// Statistics about cache clear operation
#[derive(Debug, Serialize)]
pub struct ClearStats {
    pub stores_removed: usize,
    pub entries_removed: usize,
}

/// Entry count and size of one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub name: String,
    pub entries: usize,
    pub size_bytes: usize,
}

/// Statistics about cache state
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub stores: Vec<StoreSummary>,
    pub total_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}

/// One stored response, for listings
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub url: String,
    pub status: u16,
    pub kind: String,
    pub size_bytes: usize,
    /// Unix timestamp in milliseconds
    pub stored_at: i64,
}
