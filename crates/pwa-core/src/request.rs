//! Intercepted request model.

use http::{Method, Uri};

use crate::FetchError;

/// A request intercepted by the worker, or issued by the connectivity prober.
///
/// Only the fields relevant to classification and caching are carried: the
/// method and the URL. Only GET requests are eligible for caching; all other
/// methods pass through to the network untouched.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    url: Uri,
}

impl FetchRequest {
    /// Create a request with an explicit method.
    pub fn new(method: Method, url: Uri) -> Self {
        Self { method, url }
    }

    /// Create a GET request from a URL string.
    pub fn get(url: &str) -> Result<Self, FetchError> {
        let url = url
            .parse::<Uri>()
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self::new(Method::GET, url))
    }

    /// Create a HEAD request from a URL string.
    pub fn head(url: &str) -> Result<Self, FetchError> {
        let url = url
            .parse::<Uri>()
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self::new(Method::HEAD, url))
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full request URL.
    pub fn url(&self) -> &Uri {
        &self.url
    }

    /// URL path component, used for route classification.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Key under which this request is stored in a cache generation.
    pub fn cache_key(&self) -> String {
        self.url.to_string()
    }

    /// Whether this request is eligible for interception and caching.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }
}
