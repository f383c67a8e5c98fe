//! Network fetch collaborator.

use async_trait::async_trait;

use crate::{FetchError, FetchRequest, FetchResponse};

/// Cross-origin mode for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Same-origin or CORS-checked request; status and body are readable.
    #[default]
    Cors,
    /// Cross-origin request without CORS; the response is opaque.
    NoCors,
}

/// Interaction with the HTTP cache layer below the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Normal HTTP caching.
    #[default]
    Default,
    /// Bypass the HTTP cache entirely (reachability probes).
    NoStore,
}

/// Options passed alongside a fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub mode: RequestMode,
    pub cache: CacheMode,
}

impl FetchOptions {
    /// Options for a reachability probe: no CORS, no HTTP caching.
    pub fn probe() -> Self {
        Self {
            mode: RequestMode::NoCors,
            cache: CacheMode::NoStore,
        }
    }
}

/// Network fetch collaborator.
///
/// The single seam between the toolkit and the actual network. Production
/// bindings forward to the platform fetch; tests substitute programmable
/// implementations.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue a request. Rejection maps to `FetchError`; cancellation by a
    /// caller-imposed deadline surfaces as `FetchError::Timeout`.
    async fn fetch(
        &self,
        request: &FetchRequest,
        options: &FetchOptions,
    ) -> Result<FetchResponse, FetchError>;
}
