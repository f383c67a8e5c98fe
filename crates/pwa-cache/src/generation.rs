//! Versioned cache generation lifecycle.

use std::sync::Arc;

use pwa_core::{
    CacheError, FetchOptions, FetchRequest, FetchResponse, Fetcher, InstallError, WorkerConfig,
};
use tracing::{debug, info, warn};

use crate::CacheStore;

/// Owns the named cache generations for one worker version.
///
/// At most one generation per role (static, dynamic) is current at any time;
/// every other generation found in the store is stale and removed on
/// activation.
pub struct GenerationManager<S: CacheStore> {
    store: Arc<S>,
    config: WorkerConfig,
}

impl<S: CacheStore> Clone for GenerationManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: CacheStore> GenerationManager<S> {
    /// Create a manager over a cache store.
    pub fn new(store: Arc<S>, config: WorkerConfig) -> Self {
        Self { store, config }
    }

    /// Name of the current static generation.
    pub fn static_generation(&self) -> String {
        self.config.static_generation()
    }

    /// Name of the current dynamic generation.
    pub fn dynamic_generation(&self) -> String {
        self.config.dynamic_generation()
    }

    /// Populate the static generation from the asset manifest.
    ///
    /// Atomic: if any entry fails to fetch or comes back non-success, the
    /// whole install fails and the partially populated generation is removed.
    /// A partial static cache is worse than none.
    pub async fn install(&self, fetcher: &dyn Fetcher) -> Result<(), InstallError> {
        let generation = self.static_generation();
        info!(generation = %generation, "Caching static assets");
        self.store.open(&generation).await?;

        for asset in self.config.static_assets.iter() {
            if let Err(e) = self.cache_asset(&generation, asset, fetcher).await {
                warn!(asset, error = %e, "Static asset install failed, rolling back");
                if let Err(cleanup) = self.store.delete_generation(&generation).await {
                    warn!(generation = %generation, error = %cleanup, "Rollback failed");
                }
                return Err(e);
            }
        }

        info!(
            generation = %generation,
            assets = self.config.static_assets.len(),
            "Static cache populated"
        );
        Ok(())
    }

    async fn cache_asset(
        &self,
        generation: &str,
        asset: &str,
        fetcher: &dyn Fetcher,
    ) -> Result<(), InstallError> {
        let request = FetchRequest::get(asset).map_err(|source| InstallError::AssetFetch {
            asset: asset.to_string(),
            source,
        })?;

        let response = fetcher
            .fetch(&request, &FetchOptions::default())
            .await
            .map_err(|source| InstallError::AssetFetch {
                asset: asset.to_string(),
                source,
            })?;

        if !response.is_ok() {
            return Err(InstallError::AssetStatus {
                asset: asset.to_string(),
                status: response.status().as_u16(),
            });
        }

        self.store.put(generation, &request, response).await?;
        Ok(())
    }

    /// Delete every generation that is not current.
    ///
    /// Best-effort: enumeration or deletion failures are logged, never
    /// propagated. Returns the names that were removed.
    pub async fn activate(&self) -> Vec<String> {
        let current = self.config.current_generations();
        let names = match self.store.generation_names().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Could not enumerate generations, skipping cleanup");
                return Vec::new();
            }
        };

        let mut deleted = Vec::new();
        for name in names {
            if current.contains(&name) {
                continue;
            }
            info!(generation = %name, "Deleting old cache generation");
            match self.store.delete_generation(&name).await {
                Ok(_) => deleted.push(name),
                Err(e) => warn!(generation = %name, error = %e, "Generation cleanup failed"),
            }
        }
        deleted
    }

    /// Look up a cached response within one generation.
    pub async fn get(
        &self,
        generation: &str,
        request: &FetchRequest,
    ) -> Result<Option<FetchResponse>, CacheError> {
        self.store.match_request(generation, request).await
    }

    /// Store a response within one generation.
    pub async fn put(
        &self,
        generation: &str,
        request: &FetchRequest,
        response: FetchResponse,
    ) -> Result<(), CacheError> {
        debug!(generation = %generation, key = %request.cache_key(), "Caching response");
        self.store.put(generation, request, response).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pwa_core::FetchError;

    use super::*;
    use crate::MemoryCacheStore;

    /// Fetcher serving a fixed URL->body table; anything else is a network
    /// error.
    struct TableFetcher {
        responses: HashMap<String, FetchResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl TableFetcher {
        fn new(entries: &[(&str, FetchResponse)]) -> Self {
            Self {
                responses: entries
                    .iter()
                    .map(|(url, resp)| (url.to_string(), resp.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Fetcher for TableFetcher {
        async fn fetch(
            &self,
            request: &FetchRequest,
            _options: &FetchOptions,
        ) -> Result<FetchResponse, FetchError> {
            let key = request.cache_key();
            self.calls.lock().unwrap().push(key.clone());
            self.responses
                .get(&key)
                .cloned()
                .ok_or_else(|| FetchError::Network("unreachable".to_string()))
        }
    }

    fn config_with_assets(assets: &[&str]) -> WorkerConfig {
        WorkerConfig::new("pwa-kit", "v1").with_static_assets(
            pwa_core::StaticAssetManifest::new(assets.iter().copied()),
        )
    }

    #[tokio::test]
    async fn test_install_populates_every_manifest_entry() {
        let store = Arc::new(MemoryCacheStore::new());
        let manager = GenerationManager::new(
            Arc::clone(&store),
            config_with_assets(&["/", "/app.js"]),
        );
        let fetcher = TableFetcher::new(&[
            ("/", FetchResponse::ok("shell")),
            ("/app.js", FetchResponse::ok("js")),
        ]);

        manager.install(&fetcher).await.unwrap();
        assert_eq!(store.entry_count("pwa-kit-v1-static").await, 2);
    }

    #[tokio::test]
    async fn test_install_is_atomic_on_fetch_failure() {
        let store = Arc::new(MemoryCacheStore::new());
        let manager = GenerationManager::new(
            Arc::clone(&store),
            config_with_assets(&["/", "/missing.js", "/app.js"]),
        );
        let fetcher = TableFetcher::new(&[
            ("/", FetchResponse::ok("shell")),
            ("/app.js", FetchResponse::ok("js")),
        ]);

        let result = manager.install(&fetcher).await;
        assert!(matches!(result, Err(InstallError::AssetFetch { .. })));
        // No partial static cache survives the failure.
        assert_eq!(store.entry_count("pwa-kit-v1-static").await, 0);
    }

    #[tokio::test]
    async fn test_install_rejects_non_success_status() {
        let store = Arc::new(MemoryCacheStore::new());
        let manager =
            GenerationManager::new(Arc::clone(&store), config_with_assets(&["/gone.css"]));
        let fetcher = TableFetcher::new(&[(
            "/gone.css",
            FetchResponse::with_status(http::StatusCode::NOT_FOUND, ""),
        )]);

        let result = manager.install(&fetcher).await;
        assert!(matches!(
            result,
            Err(InstallError::AssetStatus { status: 404, .. })
        ));
        assert_eq!(store.entry_count("pwa-kit-v1-static").await, 0);
    }

    #[tokio::test]
    async fn test_activate_deletes_only_stale_generations() {
        let store = Arc::new(MemoryCacheStore::new());
        store.open("pwa-kit-v1-static").await.unwrap();
        store.open("pwa-kit-v1-dynamic").await.unwrap();
        store.open("pwa-kit-v0-static").await.unwrap();
        store.open("pwa-kit-v0-dynamic").await.unwrap();

        let manager =
            GenerationManager::new(Arc::clone(&store), WorkerConfig::new("pwa-kit", "v1"));
        let mut deleted = manager.activate().await;
        deleted.sort();

        assert_eq!(
            deleted,
            vec!["pwa-kit-v0-dynamic".to_string(), "pwa-kit-v0-static".to_string()]
        );
        let mut remaining = store.generation_names().await.unwrap();
        remaining.sort();
        assert_eq!(
            remaining,
            vec!["pwa-kit-v1-dynamic".to_string(), "pwa-kit-v1-static".to_string()]
        );
    }

    #[tokio::test]
    async fn test_install_fetches_manifest_in_order() {
        let store = Arc::new(MemoryCacheStore::new());
        let manager = GenerationManager::new(
            Arc::clone(&store),
            config_with_assets(&["/a", "/b"]),
        );
        let fetcher = TableFetcher::new(&[
            ("/a", FetchResponse::ok("a")),
            ("/b", FetchResponse::ok("b")),
        ]);

        manager.install(&fetcher).await.unwrap();
        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(
            *fetcher.calls.lock().unwrap(),
            vec!["/a".to_string(), "/b".to_string()]
        );
    }
}
