//! Worker configuration: cache generation names and the static asset manifest.

use serde::{Deserialize, Serialize};

/// Static assets cached for the default application shell.
pub const DEFAULT_STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/app.js",
    "/sw.js",
    "/styles.css",
    "/connectivity.js",
    "/manifest.webmanifest",
    "/offline.html",
    "/img/icons-192.png",
    "/img/icons-512.png",
    "/favicon-32.png",
    "/apple-touch-icon.png",
];

/// Ordered list of URL paths to cache at install time.
///
/// Fixed at build/deploy time and immutable for the lifetime of a worker
/// version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAssetManifest {
    entries: Vec<String>,
}

impl StaticAssetManifest {
    /// Create a manifest from a list of URL paths.
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a request path matches a manifest entry.
    ///
    /// A path matches if it equals an entry exactly or ends with one, so
    /// `/app/styles.css` matches the entry `/styles.css`.
    pub fn matches_path(&self, path: &str) -> bool {
        self.entries
            .iter()
            .any(|asset| path == asset || path.ends_with(asset.as_str()))
    }

    /// Iterate over the manifest entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StaticAssetManifest {
    fn default() -> Self {
        Self::new(DEFAULT_STATIC_ASSETS.iter().copied())
    }
}

/// Process-wide worker configuration.
///
/// Built once at worker startup and never mutated afterwards. Cache
/// generation names are derived from the app name and version tag, so a new
/// deploy supersedes both generations wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Application name, used as the cache name prefix.
    pub app: String,
    /// Version tag, bumped on every deploy.
    pub version: String,
    /// Assets cached during install.
    pub static_assets: StaticAssetManifest,
    /// Activate the new worker version immediately after install.
    pub skip_waiting: bool,
    /// Take control of open pages immediately after activation.
    pub claim_clients: bool,
}

impl WorkerConfig {
    /// Create a configuration with the default asset manifest.
    pub fn new(app: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            version: version.into(),
            static_assets: StaticAssetManifest::default(),
            skip_waiting: true,
            claim_clients: true,
        }
    }

    /// Replace the static asset manifest.
    pub fn with_static_assets(mut self, manifest: StaticAssetManifest) -> Self {
        self.static_assets = manifest;
        self
    }

    /// Name prefix shared by both cache generations.
    pub fn cache_prefix(&self) -> String {
        format!("{}-{}", self.app, self.version)
    }

    /// Name of the current static cache generation.
    pub fn static_generation(&self) -> String {
        format!("{}-static", self.cache_prefix())
    }

    /// Name of the current dynamic cache generation.
    pub fn dynamic_generation(&self) -> String {
        format!("{}-dynamic", self.cache_prefix())
    }

    /// The set of generation names that survive activation.
    pub fn current_generations(&self) -> [String; 2] {
        [self.static_generation(), self.dynamic_generation()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_names() {
        let config = WorkerConfig::new("pwa-kit", "v1.2");
        assert_eq!(config.static_generation(), "pwa-kit-v1.2-static");
        assert_eq!(config.dynamic_generation(), "pwa-kit-v1.2-dynamic");
    }

    #[test]
    fn test_current_generations_contains_both_roles() {
        let config = WorkerConfig::new("pwa-kit", "v2");
        let current = config.current_generations();
        assert!(current.contains(&"pwa-kit-v2-static".to_string()));
        assert!(current.contains(&"pwa-kit-v2-dynamic".to_string()));
    }

    #[test]
    fn test_manifest_exact_match() {
        let manifest = StaticAssetManifest::default();
        assert!(manifest.matches_path("/index.html"));
        assert!(manifest.matches_path("/"));
    }

    #[test]
    fn test_manifest_suffix_match() {
        let manifest = StaticAssetManifest::new(["/styles.css"]);
        assert!(manifest.matches_path("/app/styles.css"));
        assert!(!manifest.matches_path("/styles.css.map"));
    }

    #[test]
    fn test_manifest_miss() {
        let manifest = StaticAssetManifest::default();
        assert!(!manifest.matches_path("/api/products"));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = WorkerConfig::new("pwa-kit", "v1");
        let json = serde_json::to_string(&config).unwrap();
        let back: WorkerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.static_generation(), config.static_generation());
        assert_eq!(back.static_assets, config.static_assets);
    }
}
