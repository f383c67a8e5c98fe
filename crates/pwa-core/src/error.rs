//! Error taxonomy shared across the toolkit.

use thiserror::Error;

/// Errors raised by the network collaborator.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The fetch was rejected (DNS failure, connection refused, offline).
    #[error("Network error: {0}")]
    Network(String),

    /// The fetch was cancelled by a timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request URL could not be parsed.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised by the cache store collaborator.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open a cache generation.
    #[error("Failed to open generation: {0}")]
    OpenFailed(String),

    /// Failed to write an entry (quota/IO). Rare, logged and ignored by
    /// callers.
    #[error("Failed to store entry: {0}")]
    WriteFailed(String),

    /// Backend store operation failed.
    #[error("Store operation failed: {0}")]
    Store(String),
}

/// Install failure: fatal to the worker version that raised it.
///
/// This is the only error allowed to propagate out of the core, because the
/// platform needs it to decide not to activate the new worker version.
#[derive(Error, Debug)]
pub enum InstallError {
    /// A manifest entry could not be fetched. The whole install aborts; no
    /// partial static cache is left behind.
    #[error("Failed to cache static asset {asset}: {source}")]
    AssetFetch {
        asset: String,
        #[source]
        source: FetchError,
    },

    /// A manifest entry fetched but came back with a non-success status.
    #[error("Static asset {asset} returned status {status}")]
    AssetStatus { asset: String, status: u16 },

    /// The cache store itself failed during install.
    #[error(transparent)]
    Store(#[from] CacheError),
}
