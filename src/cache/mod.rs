//! Named, versioned response stores used by the asset cache
//!
//! A store's name embeds the cache generation (e.g. `homepage-static-v3`).
//! Entries never expire individually; a generation is invalidated by deleting
//! its whole store.

pub mod key;
pub mod storage;

use crate::client::{Request, Response};
use crate::error::CacheError;

pub use storage::{CacheStats, CacheStorage, ClearStats, EntryInfo, StoreSummary};

pub type Result<T> = std::result::Result<T, CacheError>;

/// Storage seam for the asset cache.
///
/// Writes to the same (store, request) pair are last-write-wins.
pub trait CacheStore: Send + Sync {
    /// Create the named store if it does not exist yet
    fn open(&self, cache_name: &str) -> Result<()>;

    /// Names of all existing stores
    fn keys(&self) -> Result<Vec<String>>;

    /// Delete a store and every entry in it. Returns false if it did not exist.
    fn delete(&self, cache_name: &str) -> Result<bool>;

    /// Store a response snapshot for a request
    fn put(&self, cache_name: &str, request: &Request, response: &Response) -> Result<()>;

    /// Most recently stored response for this request identity, across all stores
    fn lookup(&self, request: &Request) -> Result<Option<Response>>;
}
