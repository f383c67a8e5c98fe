//! Request classification into strategy classes.

use pwa_core::StaticAssetManifest;

/// Strategy class for an intercepted GET request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// App-shell asset, served cache-first.
    Static,
    /// API or JSON resource, served network-first.
    DynamicApi,
    /// Everything else, served stale-while-revalidate.
    DynamicOther,
}

/// Classify a request path.
///
/// The static manifest match is checked first and wins even if the path also
/// looks API-like. Non-GET requests must be filtered out before this point;
/// they are never intercepted.
pub fn classify(path: &str, manifest: &StaticAssetManifest) -> RouteClass {
    if manifest.matches_path(path) {
        RouteClass::Static
    } else if path.contains("api") || path.ends_with(".json") {
        RouteClass::DynamicApi
    } else {
        RouteClass::DynamicOther
    }
}
