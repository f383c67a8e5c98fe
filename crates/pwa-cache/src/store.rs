//! Cache store collaborator trait and in-memory backend.

use std::collections::HashMap;

use async_trait::async_trait;
use pwa_core::{CacheError, FetchRequest, FetchResponse};
use tokio::sync::RwLock;

/// Result type for cache store operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store keyed by (generation name, request URL).
///
/// Required atomicity contract: a `put` is atomic with respect to a
/// concurrent `match_request`. A reader observes either the previous entry
/// (or none) or the complete new entry, never a partial write. The
/// stale-while-revalidate strategy relies on this.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open a generation, creating it if absent.
    async fn open(&self, generation: &str) -> CacheResult<()>;

    /// Enumerate every stored generation name.
    async fn generation_names(&self) -> CacheResult<Vec<String>>;

    /// Delete a generation wholesale. Returns whether it existed.
    async fn delete_generation(&self, generation: &str) -> CacheResult<bool>;

    /// Look up a stored response for a request within one generation.
    async fn match_request(
        &self,
        generation: &str,
        request: &FetchRequest,
    ) -> CacheResult<Option<FetchResponse>>;

    /// Store a response under a request key within one generation.
    async fn put(
        &self,
        generation: &str,
        request: &FetchRequest,
        response: FetchResponse,
    ) -> CacheResult<()>;
}

/// In-memory cache store for development and testing.
#[derive(Default)]
pub struct MemoryCacheStore {
    generations: RwLock<HashMap<String, HashMap<String, FetchResponse>>>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a generation (zero if absent).
    pub async fn entry_count(&self, generation: &str) -> usize {
        self.generations
            .read()
            .await
            .get(generation)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn open(&self, generation: &str) -> CacheResult<()> {
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default();
        Ok(())
    }

    async fn generation_names(&self) -> CacheResult<Vec<String>> {
        Ok(self.generations.read().await.keys().cloned().collect())
    }

    async fn delete_generation(&self, generation: &str) -> CacheResult<bool> {
        Ok(self.generations.write().await.remove(generation).is_some())
    }

    async fn match_request(
        &self,
        generation: &str,
        request: &FetchRequest,
    ) -> CacheResult<Option<FetchResponse>> {
        Ok(self
            .generations
            .read()
            .await
            .get(generation)
            .and_then(|entries| entries.get(&request.cache_key()))
            .cloned())
    }

    async fn put(
        &self,
        generation: &str,
        request: &FetchRequest,
        response: FetchResponse,
    ) -> CacheResult<()> {
        self.generations
            .write()
            .await
            .entry(generation.to_string())
            .or_default()
            .insert(request.cache_key(), response);
        Ok(())
    }
}
