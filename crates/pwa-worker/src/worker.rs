//! Worker lifecycle: install, activate, fetch.

use std::sync::{Arc, Mutex};

use pwa_cache::{CacheStore, GenerationManager};
use pwa_core::{FetchRequest, FetchResponse, Fetcher, InstallError, WorkerConfig};
use tracing::{info, warn};

use crate::{classify, RouteClass};

/// Lifecycle state of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this version will never activate and the platform
    /// keeps the previous working version.
    Redundant,
}

/// The background worker core.
///
/// Each lifecycle handler is a single future the platform glue passes to the
/// event's deferral handle, so the worker is kept alive until the scoped
/// cache work completes.
pub struct ServiceWorker<S: CacheStore, F: Fetcher> {
    config: WorkerConfig,
    cache: GenerationManager<S>,
    fetcher: Arc<F>,
    state: Mutex<WorkerState>,
}

impl<S, F> ServiceWorker<S, F>
where
    S: CacheStore + Send + Sync + 'static,
    F: Fetcher + 'static,
{
    /// Create a worker over a cache store and a network fetcher.
    pub fn new(config: WorkerConfig, store: Arc<S>, fetcher: Arc<F>) -> Self {
        let cache = GenerationManager::new(store, config.clone());
        Self {
            config,
            cache,
            fetcher,
            state: Mutex::new(WorkerState::Parsed),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: WorkerState) {
        *self.state.lock().unwrap() = state;
    }

    /// Install: populate the static cache atomically.
    ///
    /// The returned error is the one failure allowed past the core; the
    /// platform uses it to discard this worker version.
    pub async fn handle_install(&self) -> Result<(), InstallError> {
        info!(version = %self.config.cache_prefix(), "Worker installing");
        self.set_state(WorkerState::Installing);

        match self.cache.install(self.fetcher.as_ref()).await {
            Ok(()) => {
                self.set_state(WorkerState::Installed);
                if self.config.skip_waiting {
                    info!("Worker installed, skipping waiting");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Worker installation failed");
                self.set_state(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    /// Activate: garbage-collect generations from older versions.
    ///
    /// Best-effort; cleanup failures never block activation. Returns the
    /// deleted generation names.
    pub async fn handle_activate(&self) -> Vec<String> {
        info!(version = %self.config.cache_prefix(), "Worker activating");
        self.set_state(WorkerState::Activating);

        let deleted = self.cache.activate().await;

        self.set_state(WorkerState::Activated);
        if self.config.claim_clients {
            info!("Worker activated, claiming clients");
        }
        deleted
    }

    /// Fetch: route an intercepted request through its strategy.
    ///
    /// Returns `None` for requests the worker does not intercept (non-GET);
    /// those pass straight to the network. Otherwise always yields a
    /// response, at worst a synthetic 503.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Option<FetchResponse> {
        if !request.is_cacheable() {
            return None;
        }

        let response = match classify(request.path(), &self.config.static_assets) {
            RouteClass::Static => {
                crate::cache_first(
                    request,
                    &self.cache.static_generation(),
                    &self.cache,
                    self.fetcher.as_ref(),
                )
                .await
            }
            RouteClass::DynamicApi => {
                crate::network_first(
                    request,
                    &self.cache.dynamic_generation(),
                    &self.cache,
                    self.fetcher.as_ref(),
                )
                .await
            }
            RouteClass::DynamicOther => {
                crate::stale_while_revalidate(
                    request,
                    &self.cache.dynamic_generation(),
                    &self.cache,
                    &self.fetcher,
                )
                .await
            }
        };
        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use http::{Method, StatusCode};
    use pwa_cache::MemoryCacheStore;
    use pwa_core::{FetchError, FetchOptions, StaticAssetManifest};

    use super::*;

    struct TableFetcher {
        responses: Mutex<HashMap<String, FetchResponse>>,
    }

    impl TableFetcher {
        fn new(entries: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    entries
                        .iter()
                        .map(|(url, body)| (url.to_string(), FetchResponse::ok(*body)))
                        .collect(),
                ),
            })
        }

        fn remove(&self, url: &str) {
            self.responses.lock().unwrap().remove(url);
        }
    }

    #[async_trait]
    impl Fetcher for TableFetcher {
        async fn fetch(
            &self,
            request: &FetchRequest,
            _options: &FetchOptions,
        ) -> Result<FetchResponse, FetchError> {
            self.responses
                .lock()
                .unwrap()
                .get(&request.cache_key())
                .cloned()
                .ok_or_else(|| FetchError::Network("unreachable".to_string()))
        }
    }

    fn shell_config() -> WorkerConfig {
        WorkerConfig::new("pwa-kit", "v1")
            .with_static_assets(StaticAssetManifest::new(["/", "/app.js"]))
    }

    fn worker_with(
        fetcher: Arc<TableFetcher>,
    ) -> (ServiceWorker<MemoryCacheStore, TableFetcher>, Arc<MemoryCacheStore>) {
        let store = Arc::new(MemoryCacheStore::new());
        let worker = ServiceWorker::new(shell_config(), Arc::clone(&store), fetcher);
        (worker, store)
    }

    #[tokio::test]
    async fn test_install_then_fetch_serves_shell_offline() {
        let fetcher = TableFetcher::new(&[("/", "shell"), ("/app.js", "js")]);
        let (worker, _) = worker_with(Arc::clone(&fetcher));

        worker.handle_install().await.unwrap();
        assert_eq!(worker.state(), WorkerState::Installed);

        // Simulate going offline: static assets must still be served.
        fetcher.remove("/");
        fetcher.remove("/app.js");
        let response = worker
            .handle_fetch(&FetchRequest::get("/app.js").unwrap())
            .await
            .unwrap();
        assert_eq!(response.body_text(), "js");
    }

    #[tokio::test]
    async fn test_failed_install_marks_worker_redundant() {
        let fetcher = TableFetcher::new(&[("/", "shell")]);
        let (worker, store) = worker_with(fetcher);

        assert!(worker.handle_install().await.is_err());
        assert_eq!(worker.state(), WorkerState::Redundant);
        assert_eq!(store.entry_count("pwa-kit-v1-static").await, 0);
    }

    #[tokio::test]
    async fn test_activate_cleans_up_previous_version() {
        let fetcher = TableFetcher::new(&[("/", "shell"), ("/app.js", "js")]);
        let (worker, store) = worker_with(fetcher);
        store.open("pwa-kit-v0-static").await.unwrap();

        worker.handle_install().await.unwrap();
        let deleted = worker.handle_activate().await;

        assert_eq!(worker.state(), WorkerState::Activated);
        assert_eq!(deleted, vec!["pwa-kit-v0-static".to_string()]);
    }

    #[tokio::test]
    async fn test_non_get_passes_through() {
        let fetcher = TableFetcher::new(&[]);
        let (worker, _) = worker_with(fetcher);

        let post = FetchRequest::new(Method::POST, "/api/cart".parse().unwrap());
        assert!(worker.handle_fetch(&post).await.is_none());
    }

    #[tokio::test]
    async fn test_api_request_uses_dynamic_generation() {
        let fetcher = TableFetcher::new(&[("/api/products", "[1,2]")]);
        let (worker, store) = worker_with(fetcher);

        let response = worker
            .handle_fetch(&FetchRequest::get("/api/products").unwrap())
            .await
            .unwrap();
        assert_eq!(response.body_text(), "[1,2]");
        assert_eq!(store.entry_count("pwa-kit-v1-dynamic").await, 1);
        assert_eq!(store.entry_count("pwa-kit-v1-static").await, 0);
    }

    #[tokio::test]
    async fn test_fetch_never_errors_even_with_everything_down() {
        let fetcher = TableFetcher::new(&[]);
        let (worker, _) = worker_with(fetcher);

        for url in ["/app.js", "/api/products", "/blog/post"] {
            let response = worker
                .handle_fetch(&FetchRequest::get(url).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }
}
