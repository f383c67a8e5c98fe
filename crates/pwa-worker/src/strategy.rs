//! The three fetch/cache strategies.
//!
//! Each strategy is an independent algorithm over a `GenerationManager` and a
//! `Fetcher`. None of them returns an error: total failure of both network
//! and cache yields a synthetic 503 placeholder.

use std::sync::Arc;

use pwa_cache::{CacheStore, GenerationManager};
use pwa_core::{FetchOptions, FetchRequest, FetchResponse, Fetcher};
use tracing::{debug, warn};

const OFFLINE_CONTENT: &str = "Offline - Content not available";
const OFFLINE_NETWORK: &str = "Offline - Network request failed";

/// Cache-first: for versioned static assets, latency wins.
///
/// Returns the cached entry if present; otherwise fetches, stores a copy of a
/// success response, and returns the network response.
pub async fn cache_first<S: CacheStore>(
    request: &FetchRequest,
    generation: &str,
    cache: &GenerationManager<S>,
    fetcher: &dyn Fetcher,
) -> FetchResponse {
    match cache.get(generation, request).await {
        Ok(Some(cached)) => return cached,
        Ok(None) => {}
        Err(e) => debug!(key = %request.cache_key(), error = %e, "Cache read failed, trying network"),
    }

    match fetcher.fetch(request, &FetchOptions::default()).await {
        Ok(response) => {
            if response.is_ok() {
                store_copy(cache, generation, request, &response).await;
            }
            response
        }
        Err(e) => {
            warn!(key = %request.cache_key(), error = %e, "Cache-first strategy exhausted");
            FetchResponse::service_unavailable(OFFLINE_CONTENT)
        }
    }
}

/// Network-first: for API and JSON resources, freshness wins.
///
/// A successful network response is stored and returned. Rejection or a
/// non-success status falls back to the cached entry, then to a 503.
pub async fn network_first<S: CacheStore>(
    request: &FetchRequest,
    generation: &str,
    cache: &GenerationManager<S>,
    fetcher: &dyn Fetcher,
) -> FetchResponse {
    match fetcher.fetch(request, &FetchOptions::default()).await {
        Ok(response) if response.is_ok() => {
            store_copy(cache, generation, request, &response).await;
            response
        }
        Ok(response) => {
            debug!(
                key = %request.cache_key(),
                status = response.status().as_u16(),
                "Network returned non-success, trying cache"
            );
            cache_fallback(cache, generation, request).await
        }
        Err(e) => {
            debug!(key = %request.cache_key(), error = %e, "Network failed, trying cache");
            cache_fallback(cache, generation, request).await
        }
    }
}

/// Stale-while-revalidate: for everything else, perceived speed wins.
///
/// The cached entry is returned immediately when present while a detached
/// task refreshes the cache in the background. Only a cache miss waits on the
/// network. The background fetch is fire-and-forget: its failure is swallowed
/// and never surfaces to the caller.
pub async fn stale_while_revalidate<S, F>(
    request: &FetchRequest,
    generation: &str,
    cache: &GenerationManager<S>,
    fetcher: &Arc<F>,
) -> FetchResponse
where
    S: CacheStore + Send + Sync + 'static,
    F: Fetcher + 'static,
{
    let cached = match cache.get(generation, request).await {
        Ok(hit) => hit,
        Err(e) => {
            debug!(key = %request.cache_key(), error = %e, "Cache read failed");
            None
        }
    };

    if let Some(cached) = cached {
        revalidate_in_background(request, generation, cache, fetcher);
        return cached;
    }

    match fetcher.fetch(request, &FetchOptions::default()).await {
        Ok(response) => {
            if response.is_ok() {
                store_copy(cache, generation, request, &response).await;
            }
            response
        }
        Err(e) => {
            warn!(key = %request.cache_key(), error = %e, "Stale-while-revalidate exhausted");
            FetchResponse::service_unavailable(OFFLINE_CONTENT)
        }
    }
}

fn revalidate_in_background<S, F>(
    request: &FetchRequest,
    generation: &str,
    cache: &GenerationManager<S>,
    fetcher: &Arc<F>,
) where
    S: CacheStore + Send + Sync + 'static,
    F: Fetcher + 'static,
{
    let request = request.clone();
    let generation = generation.to_string();
    let cache = cache.clone();
    let fetcher = Arc::clone(fetcher);

    // Deliberately unawaited; the response was already served from cache.
    tokio::spawn(async move {
        match fetcher.fetch(&request, &FetchOptions::default()).await {
            Ok(response) if response.is_ok() => {
                store_copy(&cache, &generation, &request, &response).await;
            }
            Ok(response) => debug!(
                key = %request.cache_key(),
                status = response.status().as_u16(),
                "Background revalidation returned non-success"
            ),
            Err(e) => debug!(key = %request.cache_key(), error = %e, "Background fetch failed"),
        }
    });
}

async fn cache_fallback<S: CacheStore>(
    cache: &GenerationManager<S>,
    generation: &str,
    request: &FetchRequest,
) -> FetchResponse {
    match cache.get(generation, request).await {
        Ok(Some(cached)) => cached,
        _ => FetchResponse::service_unavailable(OFFLINE_NETWORK),
    }
}

/// Store a clone of a success response; write failures are logged and
/// ignored.
async fn store_copy<S: CacheStore>(
    cache: &GenerationManager<S>,
    generation: &str,
    request: &FetchRequest,
    response: &FetchResponse,
) {
    if let Err(e) = cache.put(generation, request, response.clone()).await {
        warn!(key = %request.cache_key(), error = %e, "Cache write failed");
    }
}
